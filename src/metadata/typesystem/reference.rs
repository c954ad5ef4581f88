use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::metadata::typesystem::TypeDefinitionRc;

/// Reference to a `TypeReference`
pub type TypeRefRc = Arc<TypeReference>;
/// Reference to a `GenericParameter`
pub type GenericParameterRc = Arc<GenericParameter>;

/// The nine primitive value kinds of the class-file format, `void` included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// `boolean` (`Z`)
    Boolean,
    /// `byte` (`B`)
    Byte,
    /// `char` (`C`)
    Char,
    /// `short` (`S`)
    Short,
    /// `int` (`I`)
    Int,
    /// `long` (`J`)
    Long,
    /// `float` (`F`)
    Float,
    /// `double` (`D`)
    Double,
    /// `void` (`V`), legal only as a method return
    Void,
}

impl PrimitiveKind {
    /// The descriptor character for this kind
    #[must_use]
    pub fn descriptor_char(self) -> char {
        match self {
            PrimitiveKind::Boolean => 'Z',
            PrimitiveKind::Byte => 'B',
            PrimitiveKind::Char => 'C',
            PrimitiveKind::Short => 'S',
            PrimitiveKind::Int => 'I',
            PrimitiveKind::Long => 'J',
            PrimitiveKind::Float => 'F',
            PrimitiveKind::Double => 'D',
            PrimitiveKind::Void => 'V',
        }
    }

    /// Map a descriptor character to its kind, `None` for anything else
    ///
    /// ## Arguments
    /// * 'c' - The descriptor character
    #[must_use]
    pub fn from_descriptor_char(c: char) -> Option<PrimitiveKind> {
        match c {
            'Z' => Some(PrimitiveKind::Boolean),
            'B' => Some(PrimitiveKind::Byte),
            'C' => Some(PrimitiveKind::Char),
            'S' => Some(PrimitiveKind::Short),
            'I' => Some(PrimitiveKind::Int),
            'J' => Some(PrimitiveKind::Long),
            'F' => Some(PrimitiveKind::Float),
            'D' => Some(PrimitiveKind::Double),
            'V' => Some(PrimitiveKind::Void),
            _ => None,
        }
    }

    /// The Java source-level name of this kind
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
            PrimitiveKind::Void => "void",
        }
    }
}

/// A class or interface reference by internal name, with an optional lazily-bound resolution
/// target.
///
/// The resolution target is set at most once, when a resolver supplies the full
/// [`crate::metadata::typesystem::TypeDefinition`] behind the name. Equality ignores it -
/// two references to the same internal name are the same type whether or not either has been
/// resolved yet.
#[derive(Debug)]
pub struct ClassType {
    name: Arc<str>,
    resolution: OnceLock<TypeDefinitionRc>,
}

impl ClassType {
    /// Create an unresolved reference
    ///
    /// ## Arguments
    /// * 'name' - The internal name (`/`-separated)
    #[must_use]
    pub fn new(name: Arc<str>) -> Self {
        ClassType {
            name,
            resolution: OnceLock::new(),
        }
    }

    /// The internal name this reference designates
    #[must_use]
    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    /// The resolution target, if one has been bound
    #[must_use]
    pub fn resolution(&self) -> Option<&TypeDefinitionRc> {
        self.resolution.get()
    }

    /// Bind the resolution target. Returns false if one was already bound.
    ///
    /// ## Arguments
    /// * 'definition' - The definition this name resolves to
    pub fn resolve(&self, definition: TypeDefinitionRc) -> bool {
        self.resolution.set(definition).is_ok()
    }
}

/// A parameterized type: a raw class reference plus its type arguments, and - for the inner
/// segments of a generic signature like `LOuter<TT;>.Inner;` - the enclosing segment it hangs
/// off.
#[derive(Debug)]
pub struct ParameterizedType {
    /// The raw type (a class reference carrying the full, `$`-joined internal name)
    pub raw: TypeRefRc,
    /// The type arguments, possibly empty for an unparameterized inner segment
    pub arguments: Vec<TypeRefRc>,
    /// The enclosing segment, for inner-class signatures
    pub owner: Option<TypeRefRc>,
}

impl ParameterizedType {
    /// The simple segment name relative to the owner (`Inner` for `Outer$Inner`), or the full
    /// internal name when there is no owner.
    #[must_use]
    pub fn segment_name(&self) -> &str {
        let full = self.raw.class_name().unwrap_or("");
        match self.owner.as_deref().and_then(TypeReference::class_name) {
            Some(owner_name) => full
                .strip_prefix(owner_name)
                .and_then(|rest| rest.strip_prefix('$'))
                .unwrap_or(full),
            None => full,
        }
    }
}

/// The bound of a wildcard type argument.
#[derive(Debug, PartialEq)]
pub enum WildcardBound {
    /// `?` (`*` in the signature grammar)
    Unbounded,
    /// `? extends X` (`+X`)
    Extends(TypeRefRc),
    /// `? super X` (`-X`)
    Super(TypeRefRc),
}

/// The result of capture conversion: a wildcard pinned to a fresh type with the bound the
/// capture site implies. Produced by consumers of the type graph, never by the decoder
/// itself.
#[derive(Debug, PartialEq)]
pub struct CapturedType {
    /// The wildcard that was captured
    pub wildcard: WildcardBound,
    /// The effective bound at the capture site
    pub bound: TypeRefRc,
}

/// The bounds of a formal type parameter.
///
/// The grammar distinguishes an empty class bound (`<T:>` - the top type, implicit) from an
/// explicit one (`<T:Ljava/lang/Object;>`); that distinction is preserved so signatures print
/// back byte-exact.
#[derive(Debug)]
pub struct GenericBounds {
    /// True if the first entry of `types` is the class bound; false if the class bound was
    /// left empty and all entries are interface bounds
    pub has_class_bound: bool,
    /// The bound types, class bound first when present
    pub types: Vec<TypeRefRc>,
}

/// A named, scoped type variable introduced by a generic declaration.
///
/// Created in two phases: the name is declared first (so bounds may reference the parameter
/// itself, as in `<T::Ljava/lang/Comparable<TT;>;>`), then [`GenericParameter::bind_bounds`]
/// supplies the bounds exactly once. Equality is by name - the declaring scope disambiguates
/// shadowing at lookup time, not in the type structure.
pub struct GenericParameter {
    name: Arc<str>,
    scope: Arc<str>,
    bounds: OnceLock<GenericBounds>,
}

// Bounds may reference the parameter itself, so Debug renders them in signature spelling
// (which is terminal for type variables) rather than recursing through the bound types.
impl std::fmt::Debug for GenericParameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bounds: Vec<String> = self.bounds().iter().map(ToString::to_string).collect();
        f.debug_struct("GenericParameter")
            .field("name", &self.name)
            .field("scope", &self.scope)
            .field("bounds", &bounds)
            .finish()
    }
}

impl GenericParameter {
    /// Declare a parameter with its bounds still pending
    ///
    /// ## Arguments
    /// * 'name' - The type-variable name
    /// * 'scope' - A description of the declaring scope (internal name of the class, or the
    ///   method descriptor context)
    #[must_use]
    pub fn new(name: Arc<str>, scope: Arc<str>) -> GenericParameterRc {
        Arc::new(GenericParameter {
            name,
            scope,
            bounds: OnceLock::new(),
        })
    }

    /// The type-variable name
    #[must_use]
    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    /// The declaring scope this parameter was introduced by
    #[must_use]
    pub fn declaring_scope(&self) -> &str {
        &self.scope
    }

    /// Bind the parsed bounds. Returns false if bounds were already bound.
    ///
    /// ## Arguments
    /// * 'bounds' - The parsed bounds
    pub fn bind_bounds(&self, bounds: GenericBounds) -> bool {
        self.bounds.set(bounds).is_ok()
    }

    /// The parsed bounds, empty until [`GenericParameter::bind_bounds`] runs
    #[must_use]
    pub fn bounds(&self) -> &[TypeRefRc] {
        self.bounds.get().map_or(&[], |b| b.types.as_slice())
    }

    /// Whether the declaration carried an explicit class bound
    #[must_use]
    pub fn has_class_bound(&self) -> bool {
        self.bounds.get().is_some_and(|b| b.has_class_bound)
    }
}

/// A polymorphic type descriptor - the node type of the decoded type graph.
///
/// Every type a descriptor or signature can denote is one of these variants. References are
/// shared (`Arc`), so cyclic graphs (a class whose signature mentions itself) are represented
/// by aliasing rather than by deep copies; the resolver's self-reference pattern delivers the
/// in-progress [`TypeReference::Definition`] for exactly that purpose.
///
/// Equality is structural: internal names plus type arguments. A [`TypeReference::Class`]
/// reference and the [`TypeReference::Definition`] it resolves to compare equal when they
/// name the same type.
///
/// # Examples
///
/// ```rust
/// use jvmscope::metadata::signatures::parse_field_descriptor;
///
/// let parsed = parse_field_descriptor("[Ljava/lang/String;")?;
/// assert_eq!(parsed.to_string(), "[Ljava/lang/String;");
/// # Ok::<(), jvmscope::Error>(())
/// ```
#[derive(Debug)]
pub enum TypeReference {
    /// A primitive type
    Primitive(PrimitiveKind),
    /// A class or interface by internal name
    Class(ClassType),
    /// An array of an element type
    Array(TypeRefRc),
    /// A generic type instantiation
    Parameterized(ParameterizedType),
    /// A wildcard type argument
    Wildcard(WildcardBound),
    /// A reference to a type variable in scope
    GenericParameter(GenericParameterRc),
    /// A capture-converted wildcard
    Captured(CapturedType),
    /// A decoded type definition (the self-reference target during its own decode)
    Definition(TypeDefinitionRc),
}

impl TypeReference {
    /// Wrap a primitive kind
    #[must_use]
    pub fn primitive(kind: PrimitiveKind) -> TypeRefRc {
        Arc::new(TypeReference::Primitive(kind))
    }

    /// Create an unresolved class reference
    ///
    /// ## Arguments
    /// * 'name' - The internal name
    #[must_use]
    pub fn class(name: Arc<str>) -> TypeRefRc {
        Arc::new(TypeReference::Class(ClassType::new(name)))
    }

    /// Create an array type
    ///
    /// ## Arguments
    /// * 'element' - The element type
    #[must_use]
    pub fn array(element: TypeRefRc) -> TypeRefRc {
        Arc::new(TypeReference::Array(element))
    }

    /// The internal name this reference designates, for the class-like variants
    #[must_use]
    pub fn class_name(&self) -> Option<&str> {
        match self {
            TypeReference::Class(class_type) => Some(class_type.name()),
            TypeReference::Definition(definition) => Some(definition.internal_name()),
            TypeReference::Parameterized(parameterized) => parameterized.raw.class_name(),
            _ => None,
        }
    }

    // Equality fallback for the variants that are "a class by name": Class and Definition
    // unify, Parameterized does not (its arguments matter).
    fn plain_class_name(&self) -> Option<&str> {
        match self {
            TypeReference::Class(class_type) => Some(class_type.name()),
            TypeReference::Definition(definition) => Some(definition.internal_name()),
            _ => None,
        }
    }
}

impl PartialEq for TypeReference {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TypeReference::Primitive(a), TypeReference::Primitive(b)) => a == b,
            (TypeReference::Array(a), TypeReference::Array(b)) => a == b,
            (TypeReference::Parameterized(a), TypeReference::Parameterized(b)) => {
                a.raw == b.raw && a.arguments == b.arguments
            }
            (TypeReference::Wildcard(a), TypeReference::Wildcard(b)) => a == b,
            (TypeReference::GenericParameter(a), TypeReference::GenericParameter(b)) => {
                a.name() == b.name()
            }
            (TypeReference::Captured(a), TypeReference::Captured(b)) => a == b,
            (a, b) => match (a.plain_class_name(), b.plain_class_name()) {
                (Some(left), Some(right)) => left == right,
                _ => false,
            },
        }
    }
}

impl fmt::Display for TypeReference {
    /// Prints the signature-grammar spelling, which for non-generic types is exactly the
    /// descriptor spelling. Parsing and printing round-trip byte-exact.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeReference::Primitive(kind) => write!(f, "{}", kind.descriptor_char()),
            TypeReference::Class(class_type) => write!(f, "L{};", class_type.name()),
            TypeReference::Definition(definition) => write!(f, "L{};", definition.internal_name()),
            TypeReference::Array(element) => write!(f, "[{element}"),
            TypeReference::GenericParameter(parameter) => write!(f, "T{};", parameter.name()),
            TypeReference::Wildcard(WildcardBound::Unbounded) => f.write_str("*"),
            TypeReference::Wildcard(WildcardBound::Extends(bound)) => write!(f, "+{bound}"),
            TypeReference::Wildcard(WildcardBound::Super(bound)) => write!(f, "-{bound}"),
            TypeReference::Captured(captured) => write!(f, "{}", captured.bound),
            TypeReference::Parameterized(parameterized) => {
                match &parameterized.owner {
                    Some(owner) => {
                        // The owner prints as `L...;`; splice the inner segment before the
                        // terminator.
                        let owner_spelling = owner.to_string();
                        f.write_str(&owner_spelling[..owner_spelling.len() - 1])?;
                        write!(f, ".{}", parameterized.segment_name())?;
                    }
                    None => write!(f, "L{}", parameterized.segment_name())?,
                }
                if !parameterized.arguments.is_empty() {
                    f.write_str("<")?;
                    for argument in &parameterized.arguments {
                        write!(f, "{argument}")?;
                    }
                    f.write_str(">")?;
                }
                f.write_str(";")
            }
        }
    }
}
