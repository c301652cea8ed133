use crate::error::{ErrorKind, Result};
use crate::{EngineOptions, Workflow, vuescan};
use exn::OptionExt;
use std::collections::BTreeMap;

/// Builds a workflow engine for an installation.
pub type Factory = fn(&EngineOptions) -> Result<Box<dyn Workflow>>;

/// Engine name → constructor.
#[derive(Clone, Default)]
pub struct Registry {
    engines: BTreeMap<&'static str, Factory>,
}
impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every engine shipped with scan-batcher.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(vuescan::ENGINE_NAME, vuescan::VueScanWorkflow::create);
        registry
    }

    /// Registers `factory` under `name`, replacing any previous engine of that name.
    pub fn register(&mut self, name: &'static str, factory: Factory) -> &mut Self {
        self.engines.insert(name, factory);
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.engines.keys().copied()
    }

    /// Instantiates the engine registered under `name`.
    pub fn create(&self, name: &str, options: &EngineOptions) -> Result<Box<dyn Workflow>> {
        let factory = self.engines.get(name).ok_or_raise(|| ErrorKind::UnknownEngine(name.to_string()))?;
        tracing::debug!(engine = name, "Creating workflow engine");
        factory(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scan_batcher_template::Context;
    use std::path::{Path, PathBuf};
    use time::UtcOffset;

    struct Noop;
    impl Workflow for Noop {
        fn name(&self) -> &'static str {
            "noop"
        }

        fn run(&self, context: &mut Context, _: &Path) -> Result<()> {
            context.insert("ran", "yes");
            Ok(())
        }
    }

    fn options() -> EngineOptions {
        EngineOptions { settings: PathBuf::from("vuescan.ini"), local_offset: UtcOffset::UTC }
    }

    #[test]
    fn test_builtin_engines() {
        let registry = Registry::builtin();
        assert_eq!(registry.names().collect::<Vec<_>>(), ["vuescan"]);
        assert_eq!(registry.create("vuescan", &options()).unwrap().name(), "vuescan");
    }

    #[test]
    fn test_unknown_engine() {
        let err = Registry::builtin().create("silverfast", &options()).err().unwrap();
        assert_eq!(*err, ErrorKind::UnknownEngine("silverfast".to_string()));
    }

    #[test]
    fn test_register_custom_engine() {
        let mut registry = Registry::new();
        registry.register("noop", |_| Ok(Box::new(Noop)));
        let workflow = registry.create("noop", &options()).unwrap();
        let mut context = Context::new();
        workflow.run(&mut context, Path::new(".")).unwrap();
        assert!(context.contains("ran"));
    }
}
