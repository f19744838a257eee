//! Plugin loader - Discovers manifests and binds them to catalog handlers

use std::path::{Path, PathBuf};

use super::catalog::HandlerCatalog;
use super::manifest::PluginManifest;
use crate::application::errors::LoadError;
use crate::domain::entities::{PluginModule, PluginRegistry};

/// Registry built from a plugin directory, plus every module that failed
pub struct LoadOutcome {
    pub registry: PluginRegistry,
    pub errors: Vec<LoadError>,
}

/// Plugin loader
pub struct PluginLoader {
    plugin_dir: PathBuf,
    catalog: HandlerCatalog,
}

impl PluginLoader {
    pub fn new(plugin_dir: impl Into<PathBuf>, catalog: HandlerCatalog) -> Self {
        Self {
            plugin_dir: plugin_dir.into(),
            catalog,
        }
    }

    /// Load a single manifest and bind its handlers
    pub fn load_module(&self, path: impl AsRef<Path>) -> Result<PluginModule, LoadError> {
        let path = path.as_ref();
        let manifest = PluginManifest::from_file(path)?;

        let unknown = |handler: &str| LoadError::UnknownHandler {
            path: path.to_path_buf(),
            handler: handler.to_string(),
        };

        let mut module = PluginModule::new(manifest.metadata);
        if let Some(id) = &manifest.run {
            module = module.with_run(self.catalog.command(id).ok_or_else(|| unknown(id))?);
        }
        if let Some(id) = &manifest.handle_event {
            module = module.with_event_handler(self.catalog.event(id).ok_or_else(|| unknown(id))?);
        }
        Ok(module)
    }

    /// Walk the plugin directory one level deep and build a registry.
    ///
    /// A module that fails to load is skipped and its error collected; the
    /// rest still register. Startup-only: not meant to run concurrently.
    pub fn load(&self) -> LoadOutcome {
        let mut registry = PluginRegistry::new();
        let mut errors = Vec::new();

        if !self.plugin_dir.exists() {
            tracing::warn!("Plugin directory does not exist: {}", self.plugin_dir.display());
            return LoadOutcome { registry, errors };
        }

        let entries = match sorted_entries(&self.plugin_dir) {
            Ok(entries) => entries,
            Err(source) => {
                errors.push(LoadError::Directory {
                    path: self.plugin_dir.clone(),
                    source,
                });
                return LoadOutcome { registry, errors };
            }
        };

        let mut files = Vec::new();
        for path in entries {
            if path.is_dir() {
                match sorted_entries(&path) {
                    Ok(nested) => files.extend(nested.into_iter().filter(|p| p.is_file())),
                    Err(source) => errors.push(LoadError::Directory { path, source }),
                }
            } else {
                files.push(path);
            }
        }

        for path in files {
            match self.load_module(&path) {
                Ok(module) => {
                    if module.run.is_none() && module.handle_event.is_none() {
                        tracing::debug!("No entry points declared in {}", path.display());
                        continue;
                    }
                    tracing::info!(
                        "Loaded plugin: {} v{}",
                        module.metadata.name,
                        module.metadata.version
                    );
                    registry.register(module);
                }
                Err(e) => {
                    tracing::warn!("Error installing command from file {}: {}", path.display(), e);
                    errors.push(e);
                }
            }
        }

        LoadOutcome { registry, errors }
    }
}

/// Non-hidden entries of a directory, sorted by path
fn sorted_entries(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!("Failed to read directory entry: {}", e);
                continue;
            }
        };
        let path = entry.path();
        let hidden = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('.'));
        if !hidden {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}
