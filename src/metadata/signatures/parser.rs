use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::{
    metadata::{
        resolver::MetadataResolver,
        signatures::{ClassSignature, MethodSignature},
        typesystem::{
            GenericBounds, GenericParameter, GenericParameterRc, ParameterizedType,
            PrimitiveKind, TypeRefRc, TypeReference, WildcardBound,
        },
    },
    Error, Result,
};

/// Maximum nesting depth for type parsing
const MAX_RECURSION_DEPTH: usize = 50;

/// Recursive-descent parser over the descriptor and generic-signature grammars.
///
/// Both grammars share the cursor: descriptors (`(ILjava/lang/String;)V`) are the erased
/// subset, signatures add formal type parameters, type arguments, wildcards and type
/// variables. Parsing is single-pass over the input - the only lookahead beyond one character
/// is a non-consuming scan of a `<...>` formal-parameter block, so that a parameter bound may
/// reference a parameter declared later in the same block.
///
/// A parser optionally carries a [`MetadataResolver`]: class names then resolve through the
/// live frame stack first (which is what hands back the in-progress definition during its own
/// decode), and type variables fall back to [`MetadataResolver::find_type_variable`] after
/// the parser's own scopes. Without a resolver, names become fresh unresolved references.
///
/// # Example
///
/// ```rust
/// use jvmscope::metadata::signatures::SignatureParser;
///
/// let mut parser = SignatureParser::new("(ILjava/lang/String;[I)V");
/// let signature = parser.parse_method_descriptor()?;
/// assert_eq!(signature.parameters.len(), 3);
/// assert_eq!(signature.to_string(), "(ILjava/lang/String;[I)V");
/// # Ok::<(), jvmscope::Error>(())
/// ```
///
/// ## Notes:
/// - A parser instance is meant for a single input string; do not re-use one across
///   signatures.
/// - The grammars are those of the class-file format specification, chapter "Descriptors"
///   and attribute "Signature".
pub struct SignatureParser<'a> {
    input: &'a str,
    position: usize,
    depth: usize,
    resolver: Option<&'a MetadataResolver>,
    scope_name: Arc<str>,
    scopes: Vec<FxHashMap<Arc<str>, GenericParameterRc>>,
}

impl<'a> SignatureParser<'a> {
    /// Create a parser with no resolver
    ///
    /// ## Arguments
    /// * 'input' - The descriptor or signature string
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        SignatureParser {
            input,
            position: 0,
            depth: 0,
            resolver: None,
            scope_name: Arc::from(""),
            scopes: Vec::new(),
        }
    }

    /// Create a parser whose class and type-variable references resolve through a resolver
    ///
    /// ## Arguments
    /// * 'input' - The descriptor or signature string
    /// * 'resolver' - The resolver to consult
    #[must_use]
    pub fn with_resolver(input: &'a str, resolver: &'a MetadataResolver) -> Self {
        SignatureParser {
            input,
            position: 0,
            depth: 0,
            resolver: Some(resolver),
            scope_name: Arc::from(""),
            scopes: Vec::new(),
        }
    }

    /// Name the scope that owns formal parameters declared by this signature (used as the
    /// declaring-scope tag on [`GenericParameter`])
    ///
    /// ## Arguments
    /// * 'scope_name' - Typically the internal name of the enclosing class
    #[must_use]
    pub fn with_scope(mut self, scope_name: Arc<str>) -> Self {
        self.scope_name = scope_name;
        self
    }

    /// Bring an owner's formal type parameters into scope.
    ///
    /// Pushed scopes shadow outer ones; type-variable references resolve innermost-first.
    /// The class reader pushes the enclosing class's parameters around each method-signature
    /// parse.
    ///
    /// ## Arguments
    /// * 'parameters' - The parameters entering scope
    pub fn push_generic_context(&mut self, parameters: &[GenericParameterRc]) {
        let mut scope = FxHashMap::default();
        for parameter in parameters {
            scope.insert(parameter.name().clone(), parameter.clone());
        }
        self.scopes.push(scope);
    }

    /// Drop the innermost generic scope
    pub fn pop_generic_context(&mut self) {
        self.scopes.pop();
    }

    // ============================================================================
    // Descriptor grammar (the erased subset: no generics, no throws)
    // ============================================================================

    /// Parse a complete field descriptor
    ///
    /// # Errors
    /// Returns [`Error::MalformedSignature`] on any grammar violation, `void` included -
    /// `V` is only legal as a method return.
    pub fn parse_field_descriptor(&mut self) -> Result<TypeRefRc> {
        let parsed = self.parse_descriptor_type(false)?;
        self.finish()?;
        Ok(parsed)
    }

    /// Parse a complete method descriptor: `( field-descriptor* ) return-descriptor`
    ///
    /// # Errors
    /// Returns [`Error::MalformedSignature`] on any grammar violation.
    pub fn parse_method_descriptor(&mut self) -> Result<MethodSignature> {
        self.expect(b'(')?;

        let mut parameters = Vec::new();
        while self.peek() != Some(b')') {
            if self.peek().is_none() {
                return Err(self.error("unterminated parameter list"));
            }
            parameters.push(self.parse_descriptor_type(false)?);
        }
        self.expect(b')')?;

        let return_type = self.parse_descriptor_type(true)?;
        self.finish()?;

        Ok(MethodSignature {
            type_parameters: Vec::new(),
            parameters,
            return_type,
            throws: Vec::new(),
        })
    }

    fn parse_descriptor_type(&mut self, allow_void: bool) -> Result<TypeRefRc> {
        self.enter()?;
        let parsed = match self.peek() {
            Some(b'[') => {
                self.position += 1;
                TypeReference::array(self.parse_descriptor_type(false)?)
            }
            Some(b'L') => {
                self.position += 1;
                let name = self.read_while_not(&[b';', b'<', b'>', b'.', b':']);
                if name.is_empty() {
                    return Err(self.error("missing class name"));
                }
                self.expect(b';')?;
                self.resolve_class(name)
            }
            Some(other) => self.parse_primitive(other, allow_void)?,
            None => return Err(self.error("unexpected end of descriptor")),
        };
        self.depth -= 1;
        Ok(parsed)
    }

    // ============================================================================
    // Signature grammar (generics, wildcards, type variables)
    // ============================================================================

    /// Parse a complete type signature (a single type in generic form)
    ///
    /// # Errors
    /// Returns [`Error::MalformedSignature`] on grammar violations and
    /// [`Error::UnresolvedTypeVariable`] for `T<name>;` references no scope declares.
    pub fn parse_type_signature(&mut self) -> Result<TypeRefRc> {
        let parsed = self.parse_type_signature_inner(false)?;
        self.finish()?;
        Ok(parsed)
    }

    /// Parse a complete class signature:
    /// `formal-type-parameters? superclass-signature superinterface-signature*`
    ///
    /// # Errors
    /// Returns [`Error::MalformedSignature`] on grammar violations and
    /// [`Error::UnresolvedTypeVariable`] for unknown type variables.
    pub fn parse_class_signature(&mut self) -> Result<ClassSignature> {
        let has_parameters = self.peek() == Some(b'<');
        let type_parameters = if has_parameters {
            self.parse_formal_type_parameters()?
        } else {
            Vec::new()
        };

        let super_class = self.parse_class_type_signature()?;
        let mut interfaces = Vec::new();
        while self.peek().is_some() {
            interfaces.push(self.parse_class_type_signature()?);
        }

        if has_parameters {
            self.pop_generic_context();
        }

        Ok(ClassSignature {
            type_parameters,
            super_class,
            interfaces,
        })
    }

    /// Parse a complete method signature:
    /// `formal-type-parameters? ( type-signature* ) return-type throws-signature*`
    ///
    /// # Errors
    /// Returns [`Error::MalformedSignature`] on grammar violations and
    /// [`Error::UnresolvedTypeVariable`] for unknown type variables.
    pub fn parse_method_signature(&mut self) -> Result<MethodSignature> {
        let has_parameters = self.peek() == Some(b'<');
        let type_parameters = if has_parameters {
            self.parse_formal_type_parameters()?
        } else {
            Vec::new()
        };

        self.expect(b'(')?;
        let mut parameters = Vec::new();
        while self.peek() != Some(b')') {
            if self.peek().is_none() {
                return Err(self.error("unterminated parameter list"));
            }
            parameters.push(self.parse_type_signature_inner(false)?);
        }
        self.expect(b')')?;

        let return_type = self.parse_type_signature_inner(true)?;

        let mut throws = Vec::new();
        while self.peek() == Some(b'^') {
            self.position += 1;
            match self.peek() {
                Some(b'L') => throws.push(self.parse_class_type_signature()?),
                Some(b'T') => throws.push(self.parse_type_variable_signature()?),
                _ => return Err(self.error("expected class or type variable after '^'")),
            }
        }

        if has_parameters {
            self.pop_generic_context();
        }
        self.finish()?;

        Ok(MethodSignature {
            type_parameters,
            parameters,
            return_type,
            throws,
        })
    }

    fn parse_type_signature_inner(&mut self, allow_void: bool) -> Result<TypeRefRc> {
        match self.peek() {
            Some(b'L' | b'[' | b'T') => self.parse_field_type_signature(),
            Some(other) => self.parse_primitive(other, allow_void),
            None => Err(self.error("unexpected end of signature")),
        }
    }

    fn parse_field_type_signature(&mut self) -> Result<TypeRefRc> {
        self.enter()?;
        let parsed = match self.peek() {
            Some(b'L') => self.parse_class_type_signature()?,
            Some(b'[') => {
                self.position += 1;
                TypeReference::array(self.parse_type_signature_inner(false)?)
            }
            Some(b'T') => self.parse_type_variable_signature()?,
            _ => return Err(self.error("expected 'L', '[' or 'T'")),
        };
        self.depth -= 1;
        Ok(parsed)
    }

    fn parse_type_variable_signature(&mut self) -> Result<TypeRefRc> {
        self.expect(b'T')?;
        let name = self.read_while_not(&[b';', b'<', b'>', b'.', b':']);
        if name.is_empty() {
            return Err(self.error("missing type variable name"));
        }
        self.expect(b';')?;
        self.resolve_type_variable(name)
    }

    fn parse_class_type_signature(&mut self) -> Result<TypeRefRc> {
        self.enter()?;
        self.expect(b'L')?;

        let first = self.read_while_not(&[b'<', b';', b'.', b':', b'>']);
        if first.is_empty() {
            return Err(self.error("missing class name"));
        }

        let mut full_name = String::from(first);
        let mut arguments = if self.peek() == Some(b'<') {
            self.parse_type_arguments()?
        } else {
            Vec::new()
        };
        let mut owner: Option<TypeRefRc> = None;

        let parsed = loop {
            let raw = self.resolve_class(&full_name);
            let has_suffix = self.peek() == Some(b'.');

            // Wrap in a parameterized node when arguments or segment structure demand it;
            // a bare name stays a plain (possibly frame-resolved) reference.
            let segment = if arguments.is_empty() && owner.is_none() && !has_suffix {
                raw
            } else {
                Arc::new(TypeReference::Parameterized(ParameterizedType {
                    raw,
                    arguments: std::mem::take(&mut arguments),
                    owner: owner.take(),
                }))
            };

            match self.peek() {
                Some(b'.') => {
                    // Each inner segment inherits the generic scope of its enclosing segment
                    self.position += 1;
                    let suffix = self.read_while_not(&[b'<', b';', b'.', b':', b'>']);
                    if suffix.is_empty() {
                        return Err(self.error("missing inner class name"));
                    }
                    full_name.push('$');
                    full_name.push_str(suffix);
                    arguments = if self.peek() == Some(b'<') {
                        self.parse_type_arguments()?
                    } else {
                        Vec::new()
                    };
                    owner = Some(segment);
                }
                Some(b';') => {
                    self.position += 1;
                    break segment;
                }
                _ => return Err(self.error("expected '.', '<' or ';' in class type signature")),
            }
        };

        self.depth -= 1;
        Ok(parsed)
    }

    fn parse_type_arguments(&mut self) -> Result<Vec<TypeRefRc>> {
        self.expect(b'<')?;

        let mut arguments = Vec::new();
        loop {
            match self.peek() {
                Some(b'>') => {
                    if arguments.is_empty() {
                        return Err(self.error("type argument list must not be empty"));
                    }
                    self.position += 1;
                    return Ok(arguments);
                }
                Some(b'*') => {
                    self.position += 1;
                    arguments.push(Arc::new(TypeReference::Wildcard(WildcardBound::Unbounded)));
                }
                Some(b'+') => {
                    self.position += 1;
                    arguments.push(Arc::new(TypeReference::Wildcard(WildcardBound::Extends(
                        self.parse_field_type_signature()?,
                    ))));
                }
                Some(b'-') => {
                    self.position += 1;
                    arguments.push(Arc::new(TypeReference::Wildcard(WildcardBound::Super(
                        self.parse_field_type_signature()?,
                    ))));
                }
                Some(_) => arguments.push(self.parse_field_type_signature()?),
                None => return Err(self.error("unterminated type argument list")),
            }
        }
    }

    // Formal parameters bind in two phases: every name in the block is declared up front
    // (via a non-consuming scan), then the bounds parse with all of them in scope. A bound
    // may therefore reference its own parameter or one declared later in the same block.
    fn parse_formal_type_parameters(&mut self) -> Result<Vec<GenericParameterRc>> {
        let names = self.scan_formal_parameter_names()?;
        if names.is_empty() {
            return Err(self.error("formal type parameter list must not be empty"));
        }

        let mut scope = FxHashMap::default();
        let mut parameters = Vec::with_capacity(names.len());
        for name in names {
            let parameter = GenericParameter::new(Arc::from(name), self.scope_name.clone());
            scope.insert(parameter.name().clone(), parameter.clone());
            parameters.push(parameter);
        }
        self.scopes.push(scope);

        self.expect(b'<')?;
        for parameter in &parameters {
            let name = self.read_while_not(&[b':', b'<', b'>', b';', b'.']);
            if name != &**parameter.name() {
                return Err(self.error("formal parameter name mismatch"));
            }
            self.expect(b':')?;

            let has_class_bound = matches!(self.peek(), Some(b'L' | b'[' | b'T'));
            let mut types = Vec::new();
            if has_class_bound {
                types.push(self.parse_field_type_signature()?);
            }
            while self.peek() == Some(b':') {
                self.position += 1;
                types.push(self.parse_field_type_signature()?);
            }

            parameter.bind_bounds(GenericBounds {
                has_class_bound,
                types,
            });
        }
        self.expect(b'>')?;

        Ok(parameters)
    }

    // Non-consuming scan of a formal-parameter block, collecting the declared names. This is
    // the one place the parser looks further ahead than a single character.
    fn scan_formal_parameter_names(&self) -> Result<Vec<&'a str>> {
        let bytes = self.input.as_bytes();
        let mut i = self.position + 1; // past '<'
        let mut names = Vec::new();

        while i < bytes.len() && bytes[i] != b'>' {
            let start = i;
            while i < bytes.len() && bytes[i] != b':' {
                if matches!(bytes[i], b'<' | b'>' | b';' | b'.') {
                    return Err(self.error("malformed formal type parameter"));
                }
                i += 1;
            }
            if i == start || i >= bytes.len() {
                return Err(self.error("malformed formal type parameter"));
            }
            names.push(&self.input[start..i]);

            // Skip the class bound (possibly empty) and any interface bounds
            while i < bytes.len() && bytes[i] == b':' {
                i += 1;
                match bytes.get(i) {
                    Some(b':' | b'>') | None => {}
                    Some(_) => i = Self::skip_field_type_signature(bytes, i, self.position)?,
                }
            }
        }

        if i >= bytes.len() {
            return Err(self.error("unterminated formal type parameter list"));
        }
        Ok(names)
    }

    fn skip_field_type_signature(bytes: &[u8], mut i: usize, offset: usize) -> Result<usize> {
        let malformed = || Error::MalformedSignature {
            message: "malformed bound in formal type parameter".to_string(),
            offset,
        };

        while bytes.get(i) == Some(&b'[') {
            i += 1;
        }

        match bytes.get(i) {
            Some(b'T') => {
                while bytes.get(i) != Some(&b';') {
                    if i >= bytes.len() {
                        return Err(malformed());
                    }
                    i += 1;
                }
                Ok(i + 1)
            }
            Some(b'L') => {
                let mut depth = 0usize;
                loop {
                    i += 1;
                    match bytes.get(i) {
                        Some(b'<') => depth += 1,
                        Some(b'>') => depth = depth.checked_sub(1).ok_or_else(malformed)?,
                        Some(b';') if depth == 0 => return Ok(i + 1),
                        None => return Err(malformed()),
                        Some(_) => {}
                    }
                }
            }
            Some(&c) if PrimitiveKind::from_descriptor_char(c as char).is_some() => Ok(i + 1),
            _ => Err(malformed()),
        }
    }

    // ============================================================================
    // Shared machinery
    // ============================================================================

    fn parse_primitive(&mut self, byte: u8, allow_void: bool) -> Result<TypeRefRc> {
        let Some(kind) = PrimitiveKind::from_descriptor_char(byte as char) else {
            return Err(self.error(format!("unexpected character '{}'", byte as char)));
        };
        if kind == PrimitiveKind::Void && !allow_void {
            return Err(self.error("void is only legal as a method return"));
        }
        self.position += 1;
        Ok(TypeReference::primitive(kind))
    }

    fn resolve_class(&self, name: &str) -> TypeRefRc {
        match self.resolver {
            Some(resolver) => resolver.resolve_type(name),
            None => TypeReference::class(Arc::from(name)),
        }
    }

    fn resolve_type_variable(&self, name: &str) -> Result<TypeRefRc> {
        for scope in self.scopes.iter().rev() {
            if let Some(parameter) = scope.get(name) {
                return Ok(Arc::new(TypeReference::GenericParameter(parameter.clone())));
            }
        }
        if let Some(parameter) = self
            .resolver
            .and_then(|resolver| resolver.find_type_variable(name))
        {
            return Ok(Arc::new(TypeReference::GenericParameter(parameter)));
        }
        Err(Error::UnresolvedTypeVariable(name.to_string()))
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.position).copied()
    }

    fn expect(&mut self, expected: u8) -> Result<()> {
        match self.peek() {
            Some(found) if found == expected => {
                self.position += 1;
                Ok(())
            }
            Some(found) => Err(self.error(format!(
                "expected '{}', found '{}'",
                expected as char, found as char
            ))),
            None => Err(self.error(format!(
                "expected '{}', found end of input",
                expected as char
            ))),
        }
    }

    fn read_while_not(&mut self, stops: &[u8]) -> &'a str {
        let bytes = self.input.as_bytes();
        let start = self.position;
        while self.position < bytes.len() && !stops.contains(&bytes[self.position]) {
            self.position += 1;
        }
        &self.input[start..self.position]
    }

    fn finish(&self) -> Result<()> {
        if self.position < self.input.len() {
            Err(self.error("trailing characters after signature"))
        } else {
            Ok(())
        }
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth >= MAX_RECURSION_DEPTH {
            return Err(self.error("nesting exceeds the recursion limit"));
        }
        Ok(())
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::MalformedSignature {
            message: message.into(),
            offset: self.position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::resolver::ResolverFrame;

    #[test]
    fn test_parse_method_descriptor() {
        let mut parser = SignatureParser::new("(ILjava/lang/String;[I)V");
        let signature = parser.parse_method_descriptor().unwrap();

        assert_eq!(signature.parameters.len(), 3);
        assert_eq!(
            *signature.parameters[0],
            TypeReference::Primitive(PrimitiveKind::Int)
        );
        assert_eq!(
            signature.parameters[1].class_name(),
            Some("java/lang/String")
        );
        assert!(matches!(
            &*signature.parameters[2],
            TypeReference::Array(element)
                if **element == TypeReference::Primitive(PrimitiveKind::Int)
        ));
        assert_eq!(
            *signature.return_type,
            TypeReference::Primitive(PrimitiveKind::Void)
        );
        assert!(signature.type_parameters.is_empty());
        assert!(signature.throws.is_empty());
    }

    #[test]
    fn test_void_is_return_only() {
        let err = SignatureParser::new("V").parse_field_descriptor().unwrap_err();
        assert!(matches!(err, Error::MalformedSignature { offset: 0, .. }));

        let err = SignatureParser::new("(V)V")
            .parse_method_descriptor()
            .unwrap_err();
        assert!(matches!(err, Error::MalformedSignature { offset: 1, .. }));

        let err = SignatureParser::new("[V").parse_field_descriptor().unwrap_err();
        assert!(matches!(err, Error::MalformedSignature { .. }));
    }

    #[test]
    fn test_descriptor_rejects_generic_syntax() {
        assert!(SignatureParser::new("Ljava/util/List<Ljava/lang/String;>;")
            .parse_field_descriptor()
            .is_err());
        assert!(SignatureParser::new("TT;").parse_field_descriptor().is_err());
    }

    #[test]
    fn test_unknown_character_is_fatal_with_offset() {
        let err = SignatureParser::new("(IQ)V").parse_method_descriptor().unwrap_err();
        match err {
            Error::MalformedSignature { offset, message } => {
                assert_eq!(offset, 2);
                assert!(message.contains('Q'));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_trailing_characters_rejected() {
        assert!(SignatureParser::new("II").parse_field_descriptor().is_err());
        assert!(SignatureParser::new("()VX").parse_method_descriptor().is_err());
    }

    #[test]
    fn test_parameterized_with_wildcard_bounds() {
        let mut parser =
            SignatureParser::new("Ljava/util/Map<Ljava/lang/String;+Ljava/lang/Number;>;");
        let parsed = parser.parse_type_signature().unwrap();

        let TypeReference::Parameterized(map) = &*parsed else {
            panic!("expected a parameterized type");
        };
        assert_eq!(map.raw.class_name(), Some("java/util/Map"));
        assert_eq!(map.arguments.len(), 2);
        assert_eq!(map.arguments[0].class_name(), Some("java/lang/String"));
        assert!(matches!(
            &*map.arguments[1],
            TypeReference::Wildcard(WildcardBound::Extends(bound))
                if bound.class_name() == Some("java/lang/Number")
        ));
    }

    #[test]
    fn test_all_wildcard_forms() {
        let mut parser = SignatureParser::new("Ljava/util/List<*>;");
        let parsed = parser.parse_type_signature().unwrap();
        assert_eq!(parsed.to_string(), "Ljava/util/List<*>;");

        let mut parser = SignatureParser::new("Ljava/util/List<-Ljava/lang/Integer;>;");
        let parsed = parser.parse_type_signature().unwrap();
        assert_eq!(parsed.to_string(), "Ljava/util/List<-Ljava/lang/Integer;>;");
    }

    #[test]
    fn test_class_signature_with_formal_parameters() {
        let mut parser = SignatureParser::new(
            "<K:Ljava/lang/Object;V:Ljava/lang/Object;>Ljava/lang/Object;Ljava/util/Map<TK;TV;>;",
        );
        let signature = parser.parse_class_signature().unwrap();

        assert_eq!(signature.type_parameters.len(), 2);
        assert_eq!(&**signature.type_parameters[0].name(), "K");
        assert!(signature.type_parameters[0].has_class_bound());
        assert_eq!(signature.super_class.class_name(), Some("java/lang/Object"));
        assert_eq!(signature.interfaces.len(), 1);

        // The TK;/TV; references inside the interface resolve to the declared parameters
        let TypeReference::Parameterized(map) = &*signature.interfaces[0] else {
            panic!("expected a parameterized interface");
        };
        assert!(matches!(
            &*map.arguments[0],
            TypeReference::GenericParameter(parameter)
                if Arc::ptr_eq(parameter, &signature.type_parameters[0])
        ));
    }

    #[test]
    fn test_method_signature_with_throws() {
        let mut parser = SignatureParser::new(
            "<T:Ljava/lang/Object;>(TT;)TT;^Ljava/io/IOException;^TT;",
        );
        let signature = parser.parse_method_signature().unwrap();

        assert_eq!(signature.type_parameters.len(), 1);
        assert_eq!(signature.parameters.len(), 1);
        assert_eq!(signature.throws.len(), 2);
        assert_eq!(signature.throws[0].class_name(), Some("java/io/IOException"));
        assert!(matches!(
            &*signature.throws[1],
            TypeReference::GenericParameter(_)
        ));
    }

    #[test]
    fn test_interface_only_bound_keeps_empty_class_bound() {
        let mut parser = SignatureParser::new("<T::Ljava/lang/Runnable;>(TT;)V");
        let signature = parser.parse_method_signature().unwrap();

        let parameter = &signature.type_parameters[0];
        assert!(!parameter.has_class_bound());
        assert_eq!(parameter.bounds().len(), 1);
        assert_eq!(signature.to_string(), "<T::Ljava/lang/Runnable;>(TT;)V");
    }

    #[test]
    fn test_self_referential_bound() {
        let mut parser =
            SignatureParser::new("<T::Ljava/lang/Comparable<TT;>;>(Ljava/util/List<TT;>;)TT;");
        let signature = parser.parse_method_signature().unwrap();

        let parameter = &signature.type_parameters[0];
        let TypeReference::Parameterized(comparable) = &*parameter.bounds()[0] else {
            panic!("expected a parameterized bound");
        };
        assert!(matches!(
            &*comparable.arguments[0],
            TypeReference::GenericParameter(inner) if Arc::ptr_eq(inner, parameter)
        ));
    }

    #[test]
    fn test_forward_reference_between_parameters() {
        // T's bound references U, declared later in the same block
        let mut parser = SignatureParser::new("<T:TU;U:Ljava/lang/Number;>(TT;)TU;");
        let signature = parser.parse_method_signature().unwrap();

        let t = &signature.type_parameters[0];
        let u = &signature.type_parameters[1];
        assert!(matches!(
            &*t.bounds()[0],
            TypeReference::GenericParameter(bound) if Arc::ptr_eq(bound, u)
        ));
    }

    #[test]
    fn test_unresolved_type_variable() {
        let err = SignatureParser::new("TX;").parse_type_signature().unwrap_err();
        assert!(matches!(err, Error::UnresolvedTypeVariable(name) if name == "X"));
    }

    #[test]
    fn test_type_variable_resolves_through_pushed_context() {
        let parameter = GenericParameter::new(Arc::from("E"), Arc::from("Test"));
        let mut parser = SignatureParser::new("TE;");
        parser.push_generic_context(std::slice::from_ref(&parameter));

        let parsed = parser.parse_type_signature().unwrap();
        assert!(matches!(
            &*parsed,
            TypeReference::GenericParameter(found) if Arc::ptr_eq(found, &parameter)
        ));
    }

    #[test]
    fn test_type_variable_falls_back_to_resolver_frames() {
        let resolver = MetadataResolver::new();
        let frame = ResolverFrame::new();
        let parameter = GenericParameter::new(Arc::from("F"), Arc::from("Outer"));
        frame.add_type_variable(parameter.clone());
        let _guard = resolver.push_scoped(frame);

        let mut parser = SignatureParser::with_resolver("TF;", &resolver);
        let parsed = parser.parse_type_signature().unwrap();
        assert!(matches!(
            &*parsed,
            TypeReference::GenericParameter(found) if Arc::ptr_eq(found, &parameter)
        ));
    }

    #[test]
    fn test_class_names_resolve_through_frames() {
        let resolver = MetadataResolver::new();
        let frame = ResolverFrame::new();
        let known = TypeReference::class(Arc::from("com/example/Foo"));
        frame.add_type(known.clone());
        let _guard = resolver.push_scoped(frame);

        let mut parser = SignatureParser::with_resolver("Lcom/example/Foo;", &resolver);
        let parsed = parser.parse_type_signature().unwrap();
        assert!(Arc::ptr_eq(&parsed, &known));
    }

    #[test]
    fn test_inner_class_segments_share_scope() {
        let mut parser = SignatureParser::new("LOuter<TT;>.Inner<TT;>;");
        let parameter = GenericParameter::new(Arc::from("T"), Arc::from("Outer"));
        parser.push_generic_context(std::slice::from_ref(&parameter));

        let parsed = parser.parse_type_signature().unwrap();
        let TypeReference::Parameterized(inner) = &*parsed else {
            panic!("expected a parameterized type");
        };
        assert_eq!(inner.raw.class_name(), Some("Outer$Inner"));
        assert_eq!(inner.segment_name(), "Inner");
        assert!(inner.owner.is_some());
        assert_eq!(parsed.to_string(), "LOuter<TT;>.Inner<TT;>;");
    }

    #[test]
    fn test_recursion_limit() {
        let mut pathological = String::new();
        for _ in 0..MAX_RECURSION_DEPTH + 8 {
            pathological.push('[');
        }
        pathological.push('I');
        assert!(matches!(
            SignatureParser::new(&pathological).parse_field_descriptor(),
            Err(Error::MalformedSignature { .. })
        ));
    }

    #[test]
    fn test_empty_type_argument_list_rejected() {
        assert!(SignatureParser::new("Ljava/util/List<>;")
            .parse_type_signature()
            .is_err());
    }
}
