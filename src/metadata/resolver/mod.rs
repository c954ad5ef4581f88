//! The resolver framework - a stack of lookup frames answering type and type-variable
//! queries during a class decode.
//!
//! Each class file being decoded pushes one [`ResolverFrame`] onto the shared
//! [`MetadataResolver`]. A frame maps internal names to type references and type-variable
//! names to generic parameters, and may be mutated *while on the stack*: the class reader
//! inserts the in-progress [`crate::metadata::typesystem::TypeDefinition`] into its own frame
//! so that any descriptor parsed later in the same class file that names the enclosing type
//! resolves to the same object instead of triggering a recursive load.
//!
//! Lookups walk the stack top-down, then consult the resolver's cache, then the optional
//! [`TypeLoader`] delegate. A name nobody knows still resolves - to a fresh unresolved class
//! reference - because the decoder must tolerate forward references to types not yet loaded.
//!
//! Push and pop MUST balance on every code path. Inside the crate that is enforced by
//! [`MetadataResolver::push_scoped`], whose [`FrameGuard`] pops on drop, errors included.
//!
//! # Example
//!
//! ```rust
//! use jvmscope::metadata::resolver::{MetadataResolver, ResolverFrame};
//! use jvmscope::metadata::typesystem::TypeReference;
//! use std::sync::Arc;
//!
//! let resolver = MetadataResolver::new();
//! let frame = ResolverFrame::new();
//! frame.add_type(TypeReference::class(Arc::from("com/example/Foo")));
//!
//! {
//!     let _guard = resolver.push_scoped(frame);
//!     assert!(resolver.find_type("com/example/Foo").is_some());
//! }
//! // The guard popped the frame
//! assert!(resolver.find_type("com/example/Foo").is_none());
//! ```

use std::sync::{Arc, PoisonError, RwLock};

use crossbeam_skiplist::SkipMap;
use dashmap::DashMap;

use crate::{
    metadata::typesystem::{GenericParameterRc, TypeRefRc, TypeReference},
    Error::InvalidState,
    Result,
};

/// The outer-resolution delegate: asked for names no frame on the stack knows.
///
/// Implementations typically front a classpath, a cache of previously decoded classes, or a
/// test fixture. Must be safe for concurrent calls - multiple class readers may share one
/// resolver across threads.
pub trait TypeLoader: Send + Sync {
    /// Resolve an internal name to a type reference, `None` if the loader does not know it
    ///
    /// ## Arguments
    /// * 'internal_name' - The `/`-separated class name
    fn resolve_type(&self, internal_name: &str) -> Option<TypeRefRc>;
}

/// Reference to a `ResolverFrame`
pub type ResolverFrameRc = Arc<ResolverFrame>;

/// One scoped mapping of the frame stack.
///
/// Frames are mutated while shared (the self-reference insert happens with the frame already
/// pushed), so the maps are concurrent.
#[derive(Debug, Default)]
pub struct ResolverFrame {
    types: DashMap<Arc<str>, TypeRefRc>,
    type_variables: DashMap<Arc<str>, GenericParameterRc>,
}

impl ResolverFrame {
    /// Create an empty frame
    #[must_use]
    pub fn new() -> ResolverFrameRc {
        Arc::new(ResolverFrame::default())
    }

    /// Register a type under its internal name.
    ///
    /// References without a class name (primitives, wildcards, ...) are not registrable and
    /// are ignored.
    ///
    /// ## Arguments
    /// * 'type_ref' - The reference to register
    pub fn add_type(&self, type_ref: TypeRefRc) {
        if let Some(name) = type_ref.class_name() {
            self.types.insert(Arc::from(name), type_ref.clone());
        }
    }

    /// Remove a type by internal name
    ///
    /// ## Arguments
    /// * 'internal_name' - The name to remove
    pub fn remove_type(&self, internal_name: &str) {
        self.types.remove(internal_name);
    }

    /// Register a type variable under its name
    ///
    /// ## Arguments
    /// * 'parameter' - The generic parameter to register
    pub fn add_type_variable(&self, parameter: GenericParameterRc) {
        self.type_variables
            .insert(parameter.name().clone(), parameter);
    }

    /// Remove a type variable by name
    ///
    /// ## Arguments
    /// * 'name' - The type-variable name to remove
    pub fn remove_type_variable(&self, name: &str) {
        self.type_variables.remove(name);
    }

    /// Look up a type by internal name in this frame only
    ///
    /// ## Arguments
    /// * 'internal_name' - The name to look up
    #[must_use]
    pub fn find_type(&self, internal_name: &str) -> Option<TypeRefRc> {
        self.types.get(internal_name).map(|entry| entry.value().clone())
    }

    /// Look up a type variable by name in this frame only
    ///
    /// ## Arguments
    /// * 'name' - The type-variable name to look up
    #[must_use]
    pub fn find_type_variable(&self, name: &str) -> Option<GenericParameterRc> {
        self.type_variables
            .get(name)
            .map(|entry| entry.value().clone())
    }
}

/// The shared resolver: a frame stack, a cache of delegate answers, and the delegate itself.
///
/// Readers take a shared view (`find_*`), writers - push, pop, and frame mutation - never
/// hold the stack lock across user code. The cache uses a lock-free map so concurrent
/// `find_type` calls from parallel class readers never contend.
pub struct MetadataResolver {
    frames: RwLock<Vec<ResolverFrameRc>>,
    cache: SkipMap<String, TypeRefRc>,
    loader: Option<Arc<dyn TypeLoader>>,
}

impl std::fmt::Debug for MetadataResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataResolver")
            .field("frame_depth", &self.frame_depth())
            .field("cached", &self.cache.len())
            .field("has_loader", &self.loader.is_some())
            .finish()
    }
}

impl Default for MetadataResolver {
    fn default() -> Self {
        MetadataResolver::new()
    }
}

impl MetadataResolver {
    /// Create a resolver with no delegate
    #[must_use]
    pub fn new() -> Self {
        MetadataResolver {
            frames: RwLock::new(Vec::new()),
            cache: SkipMap::new(),
            loader: None,
        }
    }

    /// Create a resolver backed by an outer delegate
    ///
    /// ## Arguments
    /// * 'loader' - The delegate consulted on frame misses
    #[must_use]
    pub fn with_loader(loader: Arc<dyn TypeLoader>) -> Self {
        MetadataResolver {
            frames: RwLock::new(Vec::new()),
            cache: SkipMap::new(),
            loader: Some(loader),
        }
    }

    /// The current frame-stack depth
    #[must_use]
    pub fn frame_depth(&self) -> usize {
        self.frames
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Push a frame onto the top of the stack
    ///
    /// ## Arguments
    /// * 'frame' - The frame to push
    pub fn push_frame(&self, frame: ResolverFrameRc) {
        self.frames
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(frame);
    }

    /// Pop and return the top frame
    ///
    /// # Errors
    /// Returns [`InvalidState`] if the stack is empty - a pop with no matching push.
    pub fn pop_frame(&self) -> Result<ResolverFrameRc> {
        self.frames
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .pop()
            .ok_or(InvalidState("resolver frame stack is empty"))
    }

    /// Push a frame and return a guard that pops it on drop.
    ///
    /// This is the bracketed form of [`MetadataResolver::push_frame`] /
    /// [`MetadataResolver::pop_frame`]; the pop runs on every exit path, panics and early
    /// returns included.
    ///
    /// ## Arguments
    /// * 'frame' - The frame to push for the guard's lifetime
    pub fn push_scoped(&self, frame: ResolverFrameRc) -> FrameGuard<'_> {
        self.push_frame(frame);
        FrameGuard { resolver: self }
    }

    /// Look up a type by internal name: frames top-down, then the cache, then the delegate.
    ///
    /// Delegate answers are cached, so repeated lookups of the same external name hit the
    /// lock-free map.
    ///
    /// ## Arguments
    /// * 'internal_name' - The name to look up
    #[must_use]
    pub fn find_type(&self, internal_name: &str) -> Option<TypeRefRc> {
        {
            let frames = self.frames.read().unwrap_or_else(PoisonError::into_inner);
            for frame in frames.iter().rev() {
                if let Some(found) = frame.find_type(internal_name) {
                    return Some(found);
                }
            }
        }

        if let Some(cached) = self.cache.get(internal_name) {
            return Some(cached.value().clone());
        }

        let loaded = self.loader.as_ref()?.resolve_type(internal_name)?;
        self.cache
            .insert(internal_name.to_string(), loaded.clone());
        Some(loaded)
    }

    /// Look up a type variable by name, frames top-down
    ///
    /// ## Arguments
    /// * 'name' - The type-variable name to look up
    #[must_use]
    pub fn find_type_variable(&self, name: &str) -> Option<GenericParameterRc> {
        let frames = self.frames.read().unwrap_or_else(PoisonError::into_inner);
        frames
            .iter()
            .rev()
            .find_map(|frame| frame.find_type_variable(name))
    }

    /// Resolve an internal name to a type reference, never failing.
    ///
    /// A hit anywhere (frames, cache, delegate) returns the shared reference; a miss returns
    /// a fresh unresolved class reference - forward references to types not yet loaded are a
    /// normal condition, not an error.
    ///
    /// ## Arguments
    /// * 'internal_name' - The name to resolve
    #[must_use]
    pub fn resolve_type(&self, internal_name: &str) -> TypeRefRc {
        self.find_type(internal_name)
            .unwrap_or_else(|| TypeReference::class(Arc::from(internal_name)))
    }
}

/// Pops its frame when dropped. Created by [`MetadataResolver::push_scoped`].
pub struct FrameGuard<'a> {
    resolver: &'a MetadataResolver,
}

impl Drop for FrameGuard<'_> {
    fn drop(&mut self) {
        // The matching push is guaranteed by construction; an empty stack here means an
        // unbalanced external pop_frame, which the guard cannot repair.
        let _ = self.resolver.pop_frame();
    }
}
