use crate::{
    error::{Error, ErrorOrigin},
    proxy::Proxy,
    session::Session,
    store::RecordRef,
    synth::EntityBinding,
    traits::Entity,
};
use std::{fmt, iter::FusedIterator, marker::PhantomData, sync::Arc};

///
/// InstanceCollection
///
/// Result of an enumeration. Holds the raw records in store order and
/// builds typed views on demand; every call to `iter` starts a fresh pass.
///

pub struct InstanceCollection<E: Entity> {
    session: Session,
    binding: Arc<EntityBinding>,
    records: Vec<RecordRef>,
    _marker: PhantomData<fn() -> E>,
}

impl<E: Entity> InstanceCollection<E> {
    pub(crate) const fn new(
        session: Session,
        binding: Arc<EntityBinding>,
        records: Vec<RecordRef>,
    ) -> Self {
        Self {
            session,
            binding,
            records,
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.records.len()
    }

    /// Alias of `len`.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Lazy pass over the collection. Each element is bound when reached;
    /// a record that cannot be bound yields an error in its place.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, E> {
        Iter {
            collection: self,
            index: 0,
        }
    }

    ///
    /// copy_to
    ///
    /// Bind every record into `target`, starting at `index`. Fails before
    /// writing anything when `target` is too small.
    ///
    pub fn copy_to(&self, target: &mut [Option<E>], index: usize) -> Result<(), Error> {
        let available = target.len().saturating_sub(index);
        if index > target.len() || available < self.len() {
            return Err(Error::declaration(
                ErrorOrigin::Collection,
                format!(
                    "cannot copy {} '{}' instances into {available} slots",
                    self.len(),
                    self.binding.class()
                ),
            ));
        }

        for (slot, item) in target[index..].iter_mut().zip(self.iter()) {
            *slot = Some(item?);
        }

        Ok(())
    }

    /// Bind every record, failing on the first record that cannot be bound.
    pub fn to_vec(&self) -> Result<Vec<E>, Error> {
        self.iter().collect()
    }

    fn bind(&self, record: &RecordRef) -> Result<E, Error> {
        Proxy::bind(
            self.session.clone(),
            Arc::clone(&self.binding),
            Arc::clone(record),
        )
        .map(E::from_proxy)
    }
}

impl<E: Entity> fmt::Debug for InstanceCollection<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceCollection")
            .field("class", &self.binding.class())
            .field("len", &self.records.len())
            .finish()
    }
}

impl<'a, E: Entity> IntoIterator for &'a InstanceCollection<E> {
    type Item = Result<E, Error>;
    type IntoIter = Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

///
/// Iter
///

pub struct Iter<'a, E: Entity> {
    collection: &'a InstanceCollection<E>,
    index: usize,
}

impl<E: Entity> Iterator for Iter<'_, E> {
    type Item = Result<E, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.collection.records.get(self.index)?;
        self.index += 1;

        Some(self.collection.bind(record))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.collection.len() - self.index;
        (remaining, Some(remaining))
    }
}

impl<E: Entity> ExactSizeIterator for Iter<'_, E> {}

impl<E: Entity> FusedIterator for Iter<'_, E> {}

#[cfg(test)]
mod tests {
    use crate::{
        error::{ErrorKind, ErrorOrigin},
        session::Session,
        test_fixtures::{self, Element, Widget},
    };

    fn widgets() -> crate::collection::InstanceCollection<Widget> {
        Session::new(test_fixtures::store())
            .factory::<Widget>()
            .unwrap()
            .get_instances()
            .unwrap()
    }

    #[test]
    fn every_pass_starts_over() {
        let widgets = widgets();

        assert_eq!(widgets.iter().count(), 2);
        assert_eq!(widgets.iter().count(), 2);
        assert_eq!(widgets.iter().len(), 2);
    }

    #[test]
    fn iteration_is_fused() {
        let widgets = widgets();
        let mut iter = widgets.iter();

        assert!(iter.nth(1).is_some());
        assert!(iter.next().is_none());
        assert!(iter.next().is_none());
    }

    #[test]
    fn copy_to_fills_from_the_offset() {
        let widgets = widgets();
        let mut slots: Vec<Option<Widget>> = vec![None; 3];

        widgets.copy_to(&mut slots, 1).unwrap();

        assert!(slots[0].is_none());
        assert!(slots[1..].iter().all(Option::is_some));
    }

    #[test]
    fn copy_to_rejects_short_targets() {
        let widgets = widgets();
        let mut slots: Vec<Option<Widget>> = vec![None; 2];

        let err = widgets.copy_to(&mut slots, 1).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Declaration);
        assert_eq!(err.origin, ErrorOrigin::Collection);
        assert!(slots.iter().all(Option::is_none));

        assert!(widgets.copy_to(&mut slots, 5).is_err());
    }

    #[test]
    fn collections_iterate_by_reference() {
        let elements = Session::new(test_fixtures::store())
            .factory::<Element>()
            .unwrap()
            .get_instances()
            .unwrap();

        let mut ids = Vec::new();
        for element in &elements {
            ids.push(element.unwrap().id().unwrap());
        }
        ids.sort();

        assert_eq!(ids, ["g1", "s1", "w1"]);
        assert_eq!(elements.to_vec().unwrap().len(), 3);
    }
}
