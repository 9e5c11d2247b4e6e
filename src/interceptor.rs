use alloc::{sync::Arc, vec::Vec};
use core::{
    fmt::{self, Debug, Formatter},
    ops::Add,
};

use crate::binding::Binding;

type BehaviorFn = dyn Fn(Binding) -> Binding + Send + Sync;

/// Ordered chain of binding rewrites applied once, at registration time.
///
/// `b1 + b2` applies `b1` first and then `b2` to the binding `b1` produced.
/// Composition is associative and the empty chain is the identity.
#[derive(Clone, Default)]
pub struct InterceptingBehavior {
    chain: Vec<Arc<BehaviorFn>>,
}

impl InterceptingBehavior {
    #[inline]
    #[must_use]
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Binding) -> Binding + Send + Sync + 'static,
    {
        let f: Arc<BehaviorFn> = Arc::new(f);
        let mut chain = Vec::with_capacity(1);
        chain.push(f);
        Self { chain }
    }

    #[inline]
    #[must_use]
    pub fn identity() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn then(mut self, next: InterceptingBehavior) -> Self {
        self.chain.extend(next.chain);
        self
    }

    #[must_use]
    pub fn apply(&self, binding: Binding) -> Binding {
        self.chain.iter().fold(binding, |binding, behavior| behavior(binding))
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }
}

impl Add for InterceptingBehavior {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        self.then(rhs)
    }
}

impl Debug for InterceptingBehavior {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptingBehavior").field("len", &self.chain.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::InterceptingBehavior;
    use crate::{binding::Binding, key::Key, kind::Kind};

    use alloc::{sync::Arc, vec, vec::Vec};
    use parking_lot::Mutex;

    fn logging(log: &Arc<Mutex<Vec<&'static str>>>, name: &'static str) -> InterceptingBehavior {
        let log = log.clone();
        InterceptingBehavior::new(move |binding| {
            log.lock().push(name);
            binding
        })
    }

    #[test]
    fn test_application_order_is_chain_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let behavior_a = logging(&log, "A");
        let behavior_b = logging(&log, "B");

        let _ = (behavior_b + behavior_a).apply(Binding::instance(1u8));

        assert_eq!(*log.lock(), vec!["B", "A"]);
    }

    #[test]
    fn test_associativity() {
        let log = Arc::new(Mutex::new(Vec::new()));

        let left = (logging(&log, "1") + logging(&log, "2")) + logging(&log, "3");
        let _ = left.apply(Binding::instance(1u8));
        let right = logging(&log, "1") + (logging(&log, "2") + logging(&log, "3"));
        let _ = right.apply(Binding::instance(1u8));

        assert_eq!(*log.lock(), vec!["1", "2", "3", "1", "2", "3"]);
    }

    #[test]
    fn test_each_step_sees_previous_result() {
        let to_factory = InterceptingBehavior::new(|binding: Binding| binding.with_kind(Kind::Factory));
        let rename_if_factory = InterceptingBehavior::new(|binding: Binding| {
            if binding.kind() == Kind::Factory {
                binding.with_qualifier(Some("factory".into()))
            } else {
                binding
            }
        });

        let binding = (to_factory.clone() + rename_if_factory.clone()).apply(Binding::instance(1u8));
        assert_eq!(binding.key(), &Key::named::<u8>("factory"));

        let binding = (rename_if_factory + to_factory).apply(Binding::instance(1u8));
        assert_eq!(binding.key(), &Key::of::<u8>());
        assert_eq!(binding.kind(), Kind::Factory);
    }

    #[test]
    fn test_identity() {
        let binding = InterceptingBehavior::identity().apply(Binding::instance(1u8));

        assert_eq!(binding.key(), &Key::of::<u8>());
        assert!(InterceptingBehavior::identity().is_empty());
    }
}
