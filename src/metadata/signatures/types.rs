use std::fmt;

use crate::metadata::typesystem::{GenericParameterRc, TypeRefRc};

/// A parsed method signature: formal type parameters, parameter types, return type and
/// thrown types.
///
/// Produced both by the generic signature grammar (all four parts possible) and by the plain
/// method descriptor grammar (no formals, no throws - descriptors carry neither). The formal
/// parameters scope over the parameter types, the return type and the throws.
#[derive(Debug)]
pub struct MethodSignature {
    /// The formal type parameters, empty for non-generic methods
    pub type_parameters: Vec<GenericParameterRc>,
    /// The parameter types, in declaration order
    pub parameters: Vec<TypeRefRc>,
    /// The return type (`void` included)
    pub return_type: TypeRefRc,
    /// The `^`-declared thrown types, empty when the signature declares none
    pub throws: Vec<TypeRefRc>,
}

/// A parsed class signature: formal type parameters, the superclass and the implemented
/// interfaces, all in generic form.
#[derive(Debug)]
pub struct ClassSignature {
    /// The formal type parameters, empty for non-generic classes
    pub type_parameters: Vec<GenericParameterRc>,
    /// The generic superclass
    pub super_class: TypeRefRc,
    /// The generic superinterfaces, in declaration order
    pub interfaces: Vec<TypeRefRc>,
}

// Formal type parameters print as declared: `identifier : class-bound? (: interface-bound)*`,
// preserving the empty-class-bound spelling so parse -> print round-trips byte-exact.
fn fmt_type_parameters(
    f: &mut fmt::Formatter<'_>,
    parameters: &[GenericParameterRc],
) -> fmt::Result {
    if parameters.is_empty() {
        return Ok(());
    }

    f.write_str("<")?;
    for parameter in parameters {
        f.write_str(parameter.name())?;
        f.write_str(":")?;

        let bounds = parameter.bounds();
        let mut bounds = bounds.iter();
        if parameter.has_class_bound() {
            if let Some(class_bound) = bounds.next() {
                write!(f, "{class_bound}")?;
            }
        }
        for interface_bound in bounds {
            write!(f, ":{interface_bound}")?;
        }
    }
    f.write_str(">")
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_type_parameters(f, &self.type_parameters)?;
        f.write_str("(")?;
        for parameter in &self.parameters {
            write!(f, "{parameter}")?;
        }
        f.write_str(")")?;
        write!(f, "{}", self.return_type)?;
        for thrown in &self.throws {
            write!(f, "^{thrown}")?;
        }
        Ok(())
    }
}

impl fmt::Display for ClassSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_type_parameters(f, &self.type_parameters)?;
        write!(f, "{}", self.super_class)?;
        for interface in &self.interfaces {
            write!(f, "{interface}")?;
        }
        Ok(())
    }
}
