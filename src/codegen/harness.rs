//! Harness generator
//!
//! A harness is the user's code wrapped into a complete program that binds
//! one test case's arguments, calls the solution and prints the result.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use super::languages::{self, Binding};
use super::structures::StructureBuilder;
use super::template::ProgramFragments;
use super::types::{GenericType, StructureKind, TypeRegistry};
use super::CodegenError;
use crate::models::{Language, ProblemDefinition, TestCase};
use crate::utils::{hash_string, validate_identifier, validate_parameter_name};

/// A parameter with its parsed type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedParameter {
    pub name: String,
    pub ty: GenericType,
}

impl PlannedParameter {
    pub fn new(name: impl Into<String>, ty: GenericType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Language-independent shape of a harness, derived once per problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessPlan {
    pub function_name: String,
    pub parameters: Vec<PlannedParameter>,
    pub return_type: GenericType,
    /// Structure kinds needing definitions and helpers, emitted once each
    pub structures: BTreeSet<StructureKind>,
}

impl HarnessPlan {
    pub fn new(
        function_name: impl Into<String>,
        parameters: Vec<PlannedParameter>,
        return_type: GenericType,
    ) -> Self {
        let structures = parameters
            .iter()
            .map(|p| &p.ty)
            .chain(std::iter::once(&return_type))
            .filter_map(GenericType::structure)
            .collect();

        Self {
            function_name: function_name.into(),
            parameters,
            return_type,
            structures,
        }
    }

    /// Parse and check a problem's signature
    pub fn from_problem(problem: &ProblemDefinition) -> Result<Self, CodegenError> {
        validate_identifier(&problem.function_name).map_err(|reason| {
            CodegenError::InvalidSignature(format!(
                "function name '{}': {}",
                problem.function_name, reason
            ))
        })?;

        let mut seen = BTreeSet::new();
        let mut parameters = Vec::with_capacity(problem.parameters.len());
        for parameter in &problem.parameters {
            validate_parameter_name(&parameter.name).map_err(|reason| {
                CodegenError::InvalidSignature(format!("parameter '{}': {}", parameter.name, reason))
            })?;
            if parameter.name == problem.function_name {
                return Err(CodegenError::InvalidSignature(format!(
                    "parameter '{}' shadows the function name",
                    parameter.name
                )));
            }
            if !seen.insert(parameter.name.as_str()) {
                return Err(CodegenError::InvalidSignature(format!(
                    "duplicate parameter '{}'",
                    parameter.name
                )));
            }
            parameters.push(PlannedParameter::new(
                parameter.name.clone(),
                GenericType::parse(&parameter.type_name)?,
            ));
        }

        let return_type = GenericType::parse(&problem.return_type)?;
        Ok(Self::new(problem.function_name.clone(), parameters, return_type))
    }

    /// Parameter types followed by the return type
    pub fn types(&self) -> impl Iterator<Item = &GenericType> {
        self.parameters
            .iter()
            .map(|p| &p.ty)
            .chain(std::iter::once(&self.return_type))
    }
}

/// A generated program ready for the sandbox
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessArtifact {
    pub language: Language,
    /// File name the sandbox compiles the source as
    pub file_name: &'static str,
    pub source: String,
    /// SHA-256 of `source`, hex encoded
    pub digest: String,
}

impl HarnessArtifact {
    fn new(language: Language, source: String) -> Self {
        Self {
            language,
            file_name: language.source_file(),
            digest: hash_string(&source),
            source,
        }
    }
}

/// Builds harness programs from a problem template and a test case
#[derive(Debug, Clone)]
pub struct HarnessGenerator {
    registry: Arc<TypeRegistry>,
}

impl HarnessGenerator {
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Generate the harness for one test case
    pub fn generate(
        &self,
        user_code: &str,
        language: Language,
        problem: &ProblemDefinition,
        test_case: &TestCase,
    ) -> Result<HarnessArtifact, CodegenError> {
        let plan = HarnessPlan::from_problem(problem)?;
        self.generate_with_plan(&plan, user_code, language, test_case)
    }

    /// Generate harnesses for every test case of a problem, in order.
    ///
    /// Fails on the first test case that cannot be generated.
    pub fn generate_all(
        &self,
        user_code: &str,
        language: Language,
        problem: &ProblemDefinition,
    ) -> Result<Vec<HarnessArtifact>, CodegenError> {
        let plan = HarnessPlan::from_problem(problem)?;
        problem
            .test_cases
            .iter()
            .map(|test_case| self.generate_with_plan(&plan, user_code, language, test_case))
            .collect()
    }

    /// Generate a harness from an already checked plan
    pub fn generate_with_plan(
        &self,
        plan: &HarnessPlan,
        user_code: &str,
        language: Language,
        test_case: &TestCase,
    ) -> Result<HarnessArtifact, CodegenError> {
        let backend = languages::backend(language);
        let names = std::iter::once(&plan.function_name).chain(plan.parameters.iter().map(|p| &p.name));
        for name in names {
            if backend.is_reserved(name) {
                return Err(CodegenError::InvalidSignature(format!(
                    "'{}' is reserved in {}",
                    name, language
                )));
            }
        }
        for ty in plan.types() {
            self.registry.native_type(ty, language)?;
        }

        let bindings = plan
            .parameters
            .iter()
            .map(|parameter| {
                let value = test_case
                    .argument(&parameter.name)
                    .ok_or_else(|| CodegenError::MissingArgument(parameter.name.clone()))?;
                Ok(Binding {
                    name: parameter.name.clone(),
                    native_type: self.registry.native_type(&parameter.ty, language)?.to_string(),
                    expression: self.registry.literal(value, &parameter.ty, language)?,
                })
            })
            .collect::<Result<Vec<_>, CodegenError>>()?;

        let prepared = backend.prepare_user_code(user_code);

        let mut includes = backend.includes(plan);
        for import in prepared.imports {
            if !includes.contains(&import) {
                includes.push(import);
            }
        }

        let type_definitions = plan
            .structures
            .iter()
            .map(|kind| StructureBuilder::type_definition(*kind, language))
            .collect();

        let mut helpers: Vec<String> = plan
            .structures
            .iter()
            .flat_map(|kind| StructureBuilder::helper_functions(*kind, language))
            .collect();
        helpers.extend(backend.output_helpers(plan));

        let fragments = ProgramFragments {
            includes,
            type_definitions,
            user_code: prepared.body,
            helpers: backend.wrap_helpers(helpers),
            entry_point: backend.entry_point(plan, &bindings),
        };

        let artifact = HarnessArtifact::new(language, fragments.assemble());
        debug!(
            language = %language,
            function = %plan.function_name,
            digest = %artifact.digest,
            "Generated harness"
        );
        Ok(artifact)
    }
}
