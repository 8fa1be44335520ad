//! Native handles - scoped ownership of one engine resource.
//!
//! A [`NativeHandle`] owns a raw node or config handle and frees it exactly
//! once, either through [`NativeHandle::release`] or on drop. It also owns the
//! context link that lets the engine find the proxy wrapping the resource.
//!
//! # Release protocol
//!
//! 1. Drop the context link (registry slot first, then the engine's
//!    user-data slot)
//! 2. Unless the handle wraps the shared default, swap the raw value for the
//!    null sentinel and free the resource
//!
//! Release never fails and is idempotent. During thread teardown the
//! registries may already be gone; release then skips what it cannot reach.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::thread::LocalKey;

use crate::context::{ContextRegistry, ContextToken};
use crate::error::{Error, Result};

/// One kind of engine resource (node or config).
pub(crate) trait ResourceKind: 'static {
    type Raw: Copy + PartialEq + std::fmt::Debug;
    type Proxy: 'static;

    /// Name used in error messages.
    const NAME: &'static str;
    const NULL: Self::Raw;

    fn free(raw: Self::Raw);
    fn set_native_context(raw: Self::Raw, token: u64);
    fn native_context(raw: Self::Raw) -> u64;
    fn registry() -> &'static LocalKey<RefCell<ContextRegistry<Self::Proxy>>>;
}

/// Owner of one engine resource and its context link.
pub(crate) struct NativeHandle<K: ResourceKind> {
    raw: Cell<K::Raw>,
    shared: bool,
    link: Cell<ContextToken>,
}

impl<K: ResourceKind> NativeHandle<K> {
    /// Take ownership of a freshly allocated resource.
    pub fn acquire(raw: K::Raw) -> Result<Self> {
        if raw == K::NULL {
            return Err(Error::Allocation { kind: K::NAME });
        }
        Ok(Self { raw: Cell::new(raw), shared: false, link: Cell::new(ContextToken::NONE) })
    }

    /// Wrap the engine's shared default. Release never frees it.
    pub fn shared(raw: K::Raw) -> Self {
        Self { raw: Cell::new(raw), shared: true, link: Cell::new(ContextToken::NONE) }
    }

    #[inline]
    pub fn raw(&self) -> K::Raw {
        self.raw.get()
    }

    /// True once released (or if it never held a resource).
    #[inline]
    pub fn is_invalid(&self) -> bool {
        self.raw.get() == K::NULL
    }

    #[inline]
    pub fn is_shared(&self) -> bool {
        self.shared
    }

    #[inline]
    pub fn has_context(&self) -> bool {
        !self.link.get().is_none()
    }

    /// Link the resource to its proxy. The first link wins; later calls do
    /// nothing until [`release_context`](Self::release_context) runs.
    pub fn set_context(&self, owner: Weak<K::Proxy>) {
        if self.has_context() || self.is_invalid() {
            return;
        }
        let token = K::registry().with(|registry| registry.borrow_mut().link(owner));
        K::set_native_context(self.raw(), token.as_raw());
        self.link.set(token);
    }

    /// Drop the context link so a new one can be made.
    pub fn release_context(&self) {
        let token = self.link.replace(ContextToken::NONE);
        if token.is_none() {
            return;
        }
        let _ = K::registry().try_with(|registry| {
            if let Ok(mut registry) = registry.try_borrow_mut() {
                registry.unlink(token);
            }
        });
        if !self.is_invalid() {
            K::set_native_context(self.raw(), 0);
        }
    }

    /// Release the resource. Idempotent and infallible.
    pub fn release(&self) {
        self.release_context();
        if self.shared {
            return;
        }
        let raw = self.raw.replace(K::NULL);
        if raw != K::NULL {
            K::free(raw);
        }
    }

    /// Find the proxy linked to `raw`.
    ///
    /// `Ok(None)` for the null handle or an unlinked resource;
    /// [`Error::StaleReference`] when the linked proxy no longer exists.
    pub fn get_context(raw: K::Raw) -> Result<Option<Rc<K::Proxy>>> {
        if raw == K::NULL {
            return Ok(None);
        }
        let token = ContextToken::from_raw(K::native_context(raw));
        K::registry()
            .try_with(|registry| registry.borrow().resolve(token))
            .map_err(|_| Error::StaleReference { kind: K::NAME })?
            .map_err(|_| Error::StaleReference { kind: K::NAME })
    }
}

impl<K: ResourceKind> Drop for NativeHandle<K> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<K: ResourceKind> std::fmt::Debug for NativeHandle<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeHandle")
            .field("kind", &K::NAME)
            .field("raw", &self.raw.get())
            .field("shared", &self.shared)
            .field("linked", &self.has_context())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    thread_local! {
        static FREED: RefCell<Vec<u32>> = const { RefCell::new(Vec::new()) };
        static SLOTS: RefCell<HashMap<u32, u64>> = RefCell::new(HashMap::new());
        static REGISTRY: RefCell<ContextRegistry<String>> =
            const { RefCell::new(ContextRegistry::new()) };
    }

    struct TestKind;

    impl ResourceKind for TestKind {
        type Raw = u32;
        type Proxy = String;

        const NAME: &'static str = "test";
        const NULL: u32 = 0;

        fn free(raw: u32) {
            FREED.with(|freed| freed.borrow_mut().push(raw));
        }

        fn set_native_context(raw: u32, token: u64) {
            SLOTS.with(|slots| slots.borrow_mut().insert(raw, token));
        }

        fn native_context(raw: u32) -> u64 {
            SLOTS.with(|slots| slots.borrow().get(&raw).copied().unwrap_or(0))
        }

        fn registry() -> &'static LocalKey<RefCell<ContextRegistry<String>>> {
            &REGISTRY
        }
    }

    fn freed() -> Vec<u32> {
        FREED.with(|freed| freed.borrow().clone())
    }

    #[test]
    fn test_null_is_allocation_error() {
        assert_eq!(
            NativeHandle::<TestKind>::acquire(0).unwrap_err(),
            Error::Allocation { kind: "test" }
        );
    }

    #[test]
    fn test_release_is_idempotent() {
        let handle = NativeHandle::<TestKind>::acquire(7).unwrap();
        handle.release();
        handle.release();
        assert!(handle.is_invalid());
        drop(handle);
        assert_eq!(freed(), vec![7]);
    }

    #[test]
    fn test_shared_never_freed() {
        let handle = NativeHandle::<TestKind>::shared(3);
        let proxy = Rc::new("default".to_owned());
        handle.set_context(Rc::downgrade(&proxy));
        handle.release();
        drop(handle);

        assert!(freed().is_empty());
        assert_eq!(TestKind::native_context(3), 0);
    }

    #[test]
    fn test_first_link_wins() {
        let handle = NativeHandle::<TestKind>::acquire(9).unwrap();
        let first = Rc::new("first".to_owned());
        let second = Rc::new("second".to_owned());

        handle.set_context(Rc::downgrade(&first));
        handle.set_context(Rc::downgrade(&second));
        let resolved = NativeHandle::<TestKind>::get_context(9).unwrap().unwrap();
        assert_eq!(*resolved, "first");

        handle.release_context();
        handle.set_context(Rc::downgrade(&second));
        let resolved = NativeHandle::<TestKind>::get_context(9).unwrap().unwrap();
        assert_eq!(*resolved, "second");
    }

    #[test]
    fn test_stale_and_missing_links() {
        assert_eq!(NativeHandle::<TestKind>::get_context(0), Ok(None));
        assert_eq!(NativeHandle::<TestKind>::get_context(11), Ok(None));

        let handle = NativeHandle::<TestKind>::acquire(11).unwrap();
        let proxy = Rc::new("gone".to_owned());
        handle.set_context(Rc::downgrade(&proxy));
        drop(proxy);
        assert_eq!(
            NativeHandle::<TestKind>::get_context(11),
            Err(Error::StaleReference { kind: "test" })
        );
    }
}
