use std::fmt::Debug;
use std::sync::Arc;

/// A runtime execution unit instantiated for a plan step.
///
/// Many processors may implement a single step (e.g. one per partition).
/// Explain output only needs their names.
pub trait Processor: Debug + Sync + Send {
    fn name(&self) -> &str;
}

impl<P: Processor + ?Sized> Processor for &P {
    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<P: Processor + ?Sized> Processor for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<P: Processor + ?Sized> Processor for Arc<P> {
    fn name(&self) -> &str {
        (**self).name()
    }
}

/// A processor known only by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedProcessor {
    name: String,
}

impl NamedProcessor {
    pub fn new(name: impl Into<String>) -> Self {
        NamedProcessor { name: name.into() }
    }
}

impl Processor for NamedProcessor {
    fn name(&self) -> &str {
        &self.name
    }
}
