// entity
/// Declare a typed entity mapped onto a remote class.
///
/// ```ignore
/// entity! {
///     /// A physical disk.
///     pub struct Disk: StorageObject = "ROOT\\Microsoft\\Windows\\Storage:MSFT_Disk" {
///         number: u32;
///         friendly_name / set_friendly_name: String;
///         partition_style: PartitionStyle as Uint16;
///         guid: Option<String> => "Guid";
///     }
///     methods = DISK_METHODS;
/// }
/// ```
///
/// Each property line is `name [/ setter]: Type [as WireType] [=> "Remote"];`.
/// A setter makes the property writable. Methods are given as a static
/// `MethodModel` slice; typed wrappers call `Proxy::invoke`.
///
/// An entity with a parent derefs to a view of the same record through
/// the parent declaration, so inherited accessors and wrappers are called
/// directly on the child. `base()` returns that view by value.
#[macro_export]
macro_rules! entity {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident $(: $parent:ty)? = $class:literal {
            $(
                $(#[$pmeta:meta])*
                $prop:ident $(/ $setter:ident)? : $pty:ty $(as $pcast:ident)? $(=> $premote:literal)? ;
            )*
        }
        $(methods = $methods:expr;)?
    ) => {
        $(#[$meta])*
        #[derive(Clone)]
        $vis struct $name {
            proxy: $crate::proxy::Proxy,
            $(base: $parent,)?
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.debug_tuple(stringify!($name)).field(&self.proxy).finish()
            }
        }

        impl ::std::cmp::PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.proxy == other.proxy
            }
        }

        impl ::std::cmp::Eq for $name {}

        impl ::std::hash::Hash for $name {
            fn hash<H: ::std::hash::Hasher>(&self, state: &mut H) {
                ::std::hash::Hash::hash(&self.proxy, state);
            }
        }

        $(
            impl ::std::ops::Deref for $name {
                type Target = $parent;

                fn deref(&self) -> &$parent {
                    &self.base
                }
            }
        )?

        impl $crate::traits::Entity for $name {
            const MODEL: &'static $crate::model::EntityModel = &$crate::model::EntityModel {
                path: concat!(module_path!(), "::", stringify!($name)),
                class: $class,
                parent: $crate::__opt!($(
                    $crate::model::EntityRef(|| <$parent as $crate::traits::Entity>::MODEL)
                )?),
                properties: &[$(
                    $crate::model::PropertyModel {
                        name: stringify!($prop),
                        remote: $crate::__opt!($($premote)?),
                        cast: $crate::__opt!($($crate::value::WireType::$pcast)?),
                        ty: <$pty as $crate::traits::Logical>::TYPE,
                        access: $crate::__access!($($setter)?),
                    },
                )*],
                methods: $crate::__methods!($($methods)?),
            };

            fn from_proxy(proxy: $crate::proxy::Proxy) -> Self {
                Self {
                    $(
                        base: <$parent as $crate::traits::Entity>::from_proxy(
                            proxy
                                .view_as(<$parent as $crate::traits::Entity>::MODEL)
                                .unwrap_or_else(|| proxy.clone()),
                        ),
                    )?
                    proxy,
                }
            }

            fn proxy(&self) -> &$crate::proxy::Proxy {
                &self.proxy
            }

            fn into_proxy(self) -> $crate::proxy::Proxy {
                self.proxy
            }
        }

        impl $crate::traits::Logical for $name {
            const TYPE: $crate::model::LogicalType = $crate::model::LogicalType::Entity(
                $crate::model::EntityRef(|| <$name as $crate::traits::Entity>::MODEL),
            );

            fn from_value(value: $crate::value::Value) -> Option<Self> {
                match value {
                    $crate::value::Value::Entity(proxy) => proxy
                        .view_as(<$name as $crate::traits::Entity>::MODEL)
                        .map(<$name as $crate::traits::Entity>::from_proxy),
                    _ => None,
                }
            }

            fn into_value(self) -> $crate::value::Value {
                $crate::value::Value::Entity(self.proxy)
            }
        }

        #[allow(dead_code)]
        impl $name {
            $(
                $(#[$pmeta])*
                pub fn $prop(&self) -> Result<$pty, $crate::error::Error> {
                    self.proxy.get(stringify!($prop))
                }

                $(
                    pub fn $setter(&self, value: $pty) -> Result<(), $crate::error::Error> {
                        self.proxy.set(stringify!($prop), value)
                    }
                )?
            )*

            $(
                /// View this entity through its parent declaration.
                #[must_use]
                pub fn base(&self) -> $parent {
                    self.base.clone()
                }
            )?
        }
    };
}

// factory
/// Declare a factory with keyed constructors for an entity.
///
/// ```ignore
/// factory! {
///     pub struct DiskFactory for Disk {
///         new with_object_id(object_id: String);
///     }
/// }
/// ```
///
/// Each constructor becomes an associated function taking the session
/// and the key values, returning an uncommitted instance.
#[macro_export]
macro_rules! factory {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident for $entity:ty {
            $(
                new $ctor:ident ( $( $key:ident : $kty:ty $(=> $kremote:literal)? ),* $(,)? );
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default)]
        $vis struct $name;

        impl $crate::traits::FactoryKind for $name {
            type Entity = $entity;

            const MODEL: &'static $crate::model::FactoryModel = &$crate::model::FactoryModel {
                path: concat!(module_path!(), "::", stringify!($name)),
                entity: $crate::model::EntityRef(|| <$entity as $crate::traits::Entity>::MODEL),
                constructors: &[$(
                    $crate::model::ConstructorModel {
                        name: stringify!($ctor),
                        keys: &[$(
                            $crate::model::ParamModel {
                                name: stringify!($key),
                                remote: $crate::__opt!($($kremote)?),
                                cast: None,
                                ty: <$kty as $crate::traits::Logical>::TYPE,
                                direction: $crate::model::Direction::In,
                            },
                        )*],
                    },
                )*],
            };
        }

        #[allow(dead_code)]
        impl $name {
            $(
                pub fn $ctor(
                    session: &$crate::session::Session,
                    $($key: $kty),*
                ) -> Result<$entity, $crate::error::Error> {
                    session.factory_of::<Self>()?.create_with(
                        stringify!($ctor),
                        vec![$($crate::traits::Logical::into_value($key)),*],
                    )
                }
            )*
        }
    };
}

// wire_enum
/// Declare an integer-backed enumeration with its underlying wire width.
///
/// A stored null reads as discriminant 0. An enum with no variant for 0
/// therefore fails to read an unset property, and the error says so.
///
/// ```ignore
/// wire_enum! {
///     pub enum PartitionStyle: Uint16 {
///         Unknown = 0,
///         Mbr = 1,
///         Gpt = 2,
///     }
/// }
/// ```
#[macro_export]
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $repr:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $disc:literal
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )*
        }

        impl $name {
            pub const MODEL: $crate::model::EnumModel = $crate::model::EnumModel {
                path: concat!(module_path!(), "::", stringify!($name)),
                repr: $crate::value::WireType::$repr,
                variants: &[$((stringify!($variant), $disc)),*],
            };
        }

        impl $crate::traits::EnumRepr for $name {
            fn discriminant(self) -> i64 {
                match self {
                    $(Self::$variant => $disc,)*
                }
            }

            fn from_discriminant(discriminant: i64) -> Option<Self> {
                match discriminant {
                    $($disc => Some(Self::$variant),)*
                    _ => None,
                }
            }
        }

        impl $crate::traits::Logical for $name {
            const TYPE: $crate::model::LogicalType = $crate::model::LogicalType::Enum(Self::MODEL);

            fn from_value(value: $crate::value::Value) -> Option<Self> {
                let discriminant = match value {
                    $crate::value::Value::Null => 0,
                    $crate::value::Value::Int(v) => v,
                    $crate::value::Value::Uint(v) => i64::try_from(v).ok()?,
                    _ => return None,
                };

                <Self as $crate::traits::EnumRepr>::from_discriminant(discriminant)
            }

            fn into_value(self) -> $crate::value::Value {
                $crate::value::Value::Int(<Self as $crate::traits::EnumRepr>::discriminant(self))
            }
        }
    };
}

// __opt
#[doc(hidden)]
#[macro_export]
macro_rules! __opt {
    () => {
        None
    };
    ($value:expr) => {
        Some($value)
    };
}

// __access
#[doc(hidden)]
#[macro_export]
macro_rules! __access {
    () => {
        $crate::model::Access::ReadOnly
    };
    ($setter:ident) => {
        $crate::model::Access::ReadWrite
    };
}

// __methods
#[doc(hidden)]
#[macro_export]
macro_rules! __methods {
    () => {
        &[]
    };
    ($methods:expr) => {
        $methods
    };
}
