//! Runtime type tags.
//!
//! `&dyn Any` can be downcast but cannot name the type it holds. Error codes
//! and the type assertions need both, so every `'static` type carries this
//! small capability through a blanket impl.
//!
//! Erased `dyn Any` values, such as context values read back from a fault,
//! are tagged too. Their label is the erased type, since the concrete one is
//! no longer known. Guards look through one layer of `Box` or `Arc` around a
//! tagged value, so `Some(&boxed)` and `Some(&*boxed)` check the same thing.

use std::any::{self, Any};
use std::sync::Arc;

/// Runtime type tag: downcasting plus the concrete type's name.
pub trait Dynamic: Any {
    /// View as `&dyn Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Name of the concrete type, as reported by [`std::any::type_name`].
    fn type_label(&self) -> &'static str;
}

impl<T: Any> Dynamic for T {
    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn type_label(&self) -> &'static str {
        any::type_name::<T>()
    }
}

macro_rules! erased_any {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Dynamic for $ty {
                #[inline]
                fn as_any(&self) -> &dyn Any {
                    self
                }

                #[inline]
                fn type_label(&self) -> &'static str {
                    any::type_name::<Self>()
                }
            }
        )*
    };
}

erased_any!(dyn Any, dyn Any + Send, dyn Any + Send + Sync);

/// The value a guard inspects: `value` itself, or the tagged value inside a
/// `Box`/`Arc` of `dyn Dynamic` or `dyn Any + Send + Sync`.
pub(crate) fn unwrap_shared<V: Dynamic + ?Sized>(value: &V) -> (&dyn Any, &'static str) {
    let any = value.as_any();

    if let Some(boxed) = any.downcast_ref::<Box<dyn Dynamic>>() {
        return tagged(&**boxed);
    }
    if let Some(shared) = any.downcast_ref::<Arc<dyn Dynamic>>() {
        return tagged(&**shared);
    }
    if let Some(boxed) = any.downcast_ref::<Box<dyn Any + Send + Sync>>() {
        return tagged(&**boxed);
    }
    if let Some(shared) = any.downcast_ref::<Arc<dyn Any + Send + Sync>>() {
        return tagged(&**shared);
    }

    (any, value.type_label())
}

fn tagged<V: Dynamic + ?Sized>(value: &V) -> (&dyn Any, &'static str) {
    (value.as_any(), value.type_label())
}
