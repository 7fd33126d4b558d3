use core::{
    any::{type_name, Any, TypeId},
    cmp::Ordering,
    fmt,
    marker::PhantomData,
};
use parking_lot::{MappedRwLockReadGuard, MappedRwLockWriteGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    pub name: &'static str,
    pub id: TypeId,
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl PartialOrd for TypeInfo {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeInfo {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl TypeInfo {
    #[inline]
    #[must_use]
    pub fn of<T>() -> Self
    where
        T: ?Sized + 'static,
    {
        Self {
            name: type_name::<T>(),
            id: TypeId::of::<T>(),
        }
    }

    #[inline]
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        self.name.rsplit_once("::").map_or(self.name, |(_, name)| name)
    }
}

pub(crate) type AnyCell = RwLock<dyn Any + Send + Sync>;

/// Shared handle to one runtime instance.
///
/// Clones alias the same instance, so a component cached by the factory is observed
/// with the same identity by every dependent. Use [`Object::ptr_eq`] to compare identities.
#[derive(Clone)]
pub struct Object {
    inner: Arc<AnyCell>,
    type_info: TypeInfo,
}

impl Object {
    #[inline]
    #[must_use]
    pub fn new<T: Send + Sync + 'static>(value: T) -> Self {
        Self {
            inner: Arc::new(RwLock::new(value)),
            type_info: TypeInfo::of::<T>(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    #[inline]
    #[must_use]
    pub fn is<T: 'static>(&self) -> bool {
        self.type_info.id == TypeId::of::<T>()
    }

    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Object) -> bool {
        Arc::as_ptr(&self.inner).cast::<()>() == Arc::as_ptr(&other.inner).cast::<()>()
    }

    /// Locks the instance for reading.
    /// Returns `None` if the instance isn't a `T`.
    #[must_use]
    pub fn read<T: 'static>(&self) -> Option<MappedRwLockReadGuard<'_, T>> {
        if !self.is::<T>() {
            return None;
        }
        RwLockReadGuard::try_map(self.inner.read(), |any| any.downcast_ref::<T>()).ok()
    }

    /// Locks the instance for writing.
    /// Returns `None` if the instance isn't a `T`.
    #[must_use]
    pub fn write<T: 'static>(&self) -> Option<MappedRwLockWriteGuard<'_, T>> {
        if !self.is::<T>() {
            return None;
        }
        RwLockWriteGuard::try_map(self.inner.write(), |any| any.downcast_mut::<T>()).ok()
    }

    #[inline]
    #[must_use]
    pub fn downcast<T: Send + Sync + 'static>(self) -> Option<Component<T>> {
        if self.is::<T>() {
            Some(Component {
                object: self,
                _marker: PhantomData,
            })
        } else {
            None
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("type", &self.type_info.name)
            .field("ptr", &Arc::as_ptr(&self.inner).cast::<()>())
            .finish()
    }
}

/// Typed view of an [`Object`], checked once on creation
pub struct Component<T> {
    object: Object,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Component<T> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            object: self.object.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Send + Sync + 'static> Component<T> {
    #[inline]
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            object: Object::new(value),
            _marker: PhantomData,
        }
    }

    /// # Panics
    /// Never in practice: the type was checked when the component was created.
    #[must_use]
    pub fn read(&self) -> MappedRwLockReadGuard<'_, T> {
        RwLockReadGuard::map(self.object.inner.read(), |any| {
            any.downcast_ref::<T>().expect("component type checked on creation")
        })
    }

    /// # Panics
    /// Never in practice: the type was checked when the component was created.
    #[must_use]
    pub fn write(&self) -> MappedRwLockWriteGuard<'_, T> {
        RwLockWriteGuard::map(self.object.inner.write(), |any| {
            any.downcast_mut::<T>().expect("component type checked on creation")
        })
    }
}

impl<T> Component<T> {
    #[inline]
    #[must_use]
    pub const fn object(&self) -> &Object {
        &self.object
    }

    #[inline]
    #[must_use]
    pub fn into_object(self) -> Object {
        self.object
    }

    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Object) -> bool {
        self.object.ptr_eq(other)
    }
}

impl<T> fmt::Debug for Component<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Component").field(&self.object).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{Component, Object, TypeInfo};

    struct Counter(u8);
    struct Other;

    #[test]
    fn test_object_identity() {
        let object = Object::new(Counter(1));
        let alias = object.clone();
        let another = Object::new(Counter(1));

        assert!(object.ptr_eq(&alias));
        assert!(!object.ptr_eq(&another));
    }

    #[test]
    fn test_object_typed_access() {
        let object = Object::new(Counter(1));

        assert!(object.read::<Other>().is_none());
        object.write::<Counter>().unwrap().0 = 5;
        assert_eq!(object.read::<Counter>().unwrap().0, 5);
        assert_eq!(object.type_info(), TypeInfo::of::<Counter>());
        assert_eq!(object.type_info().short_name(), "Counter");
    }

    #[test]
    fn test_component_shares_object() {
        let object = Object::new(Counter(1));
        let component: Component<Counter> = object.clone().downcast().unwrap();

        component.write().0 += 1;

        assert_eq!(object.read::<Counter>().unwrap().0, 2);
        assert!(component.ptr_eq(&object));
        assert!(object.downcast::<Other>().is_none());
    }
}
