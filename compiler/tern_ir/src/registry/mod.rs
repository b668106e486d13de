//! Function registry.

use rustc_hash::FxHashMap;

use crate::function::{FunctionDescriptor, FunctionId, FunctionRef};

/// Errors raised while populating a registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("function `{name}` is already registered")]
    DuplicateFunction { name: String },
    #[error("too many functions registered")]
    RegistryFull,
}

/// Owns function descriptors and resolves them by id or name.
#[derive(Debug, Default)]
pub struct FunctionRegistry {
    functions: Vec<FunctionRef>,
    by_name: FxHashMap<String, FunctionId>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor, returning its id.
    pub fn register(&mut self, descriptor: FunctionDescriptor) -> Result<FunctionId, RegistryError> {
        if self.by_name.contains_key(descriptor.name()) {
            return Err(RegistryError::DuplicateFunction {
                name: descriptor.name().to_owned(),
            });
        }
        let index = u32::try_from(self.functions.len()).map_err(|_| RegistryError::RegistryFull)?;
        let id = FunctionId::new(index);
        self.by_name.insert(descriptor.name().to_owned(), id);
        self.functions.push(FunctionRef::new(descriptor));
        Ok(id)
    }

    pub fn get(&self, id: FunctionId) -> Option<&FunctionRef> {
        self.functions.get(id.index())
    }

    pub fn lookup(&self, name: &str) -> Option<FunctionId> {
        self.by_name.get(name).copied()
    }

    pub fn get_by_name(&self, name: &str) -> Option<&FunctionRef> {
        self.lookup(name).and_then(|id| self.get(id))
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
