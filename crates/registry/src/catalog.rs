use std::collections::HashMap;
use std::sync::Arc;

use corpus_core::ModelDeclaration;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::info;

use crate::{RegistryBuilder, RegistryError, SampleRegistry};

static GLOBAL_CATALOG: Lazy<RegistryCatalog> = Lazy::new(RegistryCatalog::new);

// Registries are built before the write lock is taken.
#[derive(Debug, Default)]
pub struct RegistryCatalog {
    registries: RwLock<HashMap<String, Arc<SampleRegistry>>>,
}

impl RegistryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global() -> &'static RegistryCatalog {
        &GLOBAL_CATALOG
    }

    pub fn deploy(
        &self,
        model: &ModelDeclaration,
        builder: &RegistryBuilder<'_>,
    ) -> Result<Arc<SampleRegistry>, RegistryError> {
        let registry = builder.build(model)?;
        Ok(self.publish(registry))
    }

    pub fn publish(&self, registry: SampleRegistry) -> Arc<SampleRegistry> {
        let registry = Arc::new(registry);
        let replaced = self
            .registries
            .write()
            .insert(registry.model_id().to_string(), registry.clone())
            .is_some();

        info!(
            model_id = %registry.model_id(),
            replaced,
            "sample registry published"
        );
        registry
    }

    pub fn get(&self, model_id: &str) -> Option<Arc<SampleRegistry>> {
        self.registries.read().get(model_id).cloned()
    }

    pub fn undeploy(&self, model_id: &str) -> Option<Arc<SampleRegistry>> {
        let removed = self.registries.write().remove(model_id);
        if removed.is_some() {
            info!(model_id, "sample registry discarded");
        }
        removed
    }

    pub fn model_ids(&self) -> Vec<String> {
        let mut ids = self.registries.read().keys().cloned().collect::<Vec<_>>();
        ids.sort();
        ids
    }
}
