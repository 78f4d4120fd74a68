//! Boundaries to the host platform: locating a runtime distribution and
//! starting/stopping a module's handle.

use std::sync::Arc;

use tracing::debug;

use crate::runner::api::RuntimeAccess;
use crate::runner::ds::error::{BridgeError, Result};
use crate::runner::ds::loader::ModuleLoader;
use crate::runner::plugin::config::{BridgeConfig, ModuleConfig};
use crate::runner::plugin::core_resolver::RegistrySource;
use crate::runner::plugin::resolver::NamespaceSource;

use super::handle::RuntimeHandle;

/// A runtime distribution found by a [`RuntimeLocator`].
#[derive(Clone)]
pub struct Distribution {
    pub name: String,
    pub version: String,
    pub sources: Vec<Arc<dyn NamespaceSource>>,
}

/// Finds the distribution a module should run on.
pub trait RuntimeLocator: Send + Sync {
    fn locate(&self, module: &str) -> Result<Distribution>;
}

/// Locator returning the namespaces compiled into this crate.
pub struct BundledLocator;

impl RuntimeLocator for BundledLocator {
    fn locate(&self, _module: &str) -> Result<Distribution> {
        Ok(Distribution {
            name: "std".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            sources: vec![Arc::new(RegistrySource::std())],
        })
    }
}

/// Starts and stops one module's isolated runtime.
pub struct ModuleActivator {
    config: ModuleConfig,
    locator: Arc<dyn RuntimeLocator>,
    parent: Option<Arc<ModuleLoader>>,
    handle: Arc<RuntimeHandle>,
}

impl ModuleActivator {
    pub fn new(config: ModuleConfig, locator: Arc<dyn RuntimeLocator>) -> Self {
        ModuleActivator {
            config,
            locator,
            parent: None,
            handle: Arc::new(RuntimeHandle::new()),
        }
    }

    /// One activator per enabled module of `config`, sharing `locator`.
    pub fn for_config(config: &BridgeConfig, locator: Arc<dyn RuntimeLocator>) -> Vec<ModuleActivator> {
        config
            .enabled_modules()
            .map(|module| ModuleActivator::new(module.clone(), locator.clone()))
            .collect()
    }

    /// Loader the module's own loader delegates to first.
    pub fn with_parent(mut self, parent: Arc<ModuleLoader>) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn handle(&self) -> Arc<RuntimeHandle> {
        self.handle.clone()
    }

    pub fn config(&self) -> &ModuleConfig {
        &self.config
    }

    /// Locate the distribution, build the module loader, initialize the
    /// handle and run the module's preloads.
    pub fn start(&self) -> Result<Arc<RuntimeHandle>> {
        if !self.config.enabled {
            return Err(BridgeError::IsolationInit {
                module: self.config.name.clone(),
                reason: "module is disabled".to_string(),
            });
        }
        let distribution = self.locator.locate(&self.config.name)?;
        debug!(
            module = %self.config.name,
            distribution = %distribution.name,
            version = %distribution.version,
            "starting module"
        );

        let mut loader = match &self.parent {
            Some(parent) => ModuleLoader::with_parent(self.config.name.clone(), parent.clone()),
            None => ModuleLoader::new(self.config.name.clone()),
        };
        for source in distribution.sources {
            loader = loader.add_source(source);
        }
        self.handle.initialize(Arc::new(loader))?;

        for path in &self.config.preload {
            if let Err(e) = self.handle.load(path) {
                self.handle.close()?;
                return Err(BridgeError::IsolationInit {
                    module: self.config.name.clone(),
                    reason: format!("preload of '{}' failed: {}", path, e),
                });
            }
        }
        Ok(self.handle.clone())
    }

    pub fn stop(&self) -> Result<()> {
        debug!(module = %self.config.name, "stopping module");
        self.handle.close()
    }
}
