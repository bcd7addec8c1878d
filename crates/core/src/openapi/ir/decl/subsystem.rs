//! Engine subsystem declarations, one per service.
//!
//! Documents that describe the same service (`"party basic"` and
//! `"party object"`) share one subsystem: the declaration is merged by its
//! final name and keeps the position of its first document.

use std::collections::BTreeSet;

use unreal_apigen_common::{GenerationMode, GeneratorConfig};

use crate::error::GenError;
use crate::openapi::ir::collisions::{EndpointNaming, ServiceNaming};
use crate::openapi::ir::emit::{render, ReplacementTable, Replacements};
use crate::openapi::ir::templates::{
    Template, LAMBDA_AUTH_DECLARATION, LAMBDA_AUTH_DEFINITION, LAMBDA_DECLARATION,
    LAMBDA_DEFINITION, RAW_AUTH_BP_DECLARATION, RAW_AUTH_BP_DEFINITION, RAW_AUTH_CPP_DECLARATION,
    RAW_AUTH_CPP_DEFINITION, RAW_BP_DECLARATION, RAW_BP_DEFINITION, RAW_CPP_DECLARATION,
    RAW_CPP_DEFINITION, RAW_MS_AUTH_BP_DEFINITION, RAW_MS_AUTH_CPP_DEFINITION,
    RAW_MS_BP_DEFINITION, RAW_MS_CPP_DEFINITION, UFUNCTION_AUTH_DECLARATION,
    UFUNCTION_AUTH_DEFINITION, UFUNCTION_DECLARATION, UFUNCTION_DEFINITION,
};
use crate::openapi::ir::utils::include_statement;
use crate::openapi::ir::wrappers::WrapperSynthesizer;
use crate::openapi::spec::OpenApiDocument;

use super::endpoint::{EndpointBuilder, EndpointDeclaration, OperationSite, ResponseRegistry};

const FEDERATIONS_PLACEHOLDER: &str = "// This section is only used in microservice code generation.";
const MICROSERVICE_INCLUDE: &str = "#include \"BeamBackend/BeamMicroserviceClientSubsystem.h\"";

/// `UBeam{Subsystem}Api` and the endpoints it exposes.
///
/// Raw, lambda-bindable and UFunction entry points are all generated for
/// every endpoint, so the variant lists reduce to one authenticated and one
/// unauthenticated list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubsystemDeclaration {
    /// Service name the subsystem was derived from.
    pub service_name: String,
    /// `{Service}` or `{Service}Ms`.
    pub subsystem_name: String,
    /// Endpoints that need no user.
    pub endpoints: Vec<EndpointDeclaration>,
    /// Endpoints that need an authenticated user.
    pub authenticated_endpoints: Vec<EndpointDeclaration>,
}

impl SubsystemDeclaration {
    /// Empty subsystem for a service.
    pub fn new(service_name: impl Into<String>, subsystem_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            subsystem_name: subsystem_name.into(),
            endpoints: Vec::new(),
            authenticated_endpoints: Vec::new(),
        }
    }

    /// File it to the list matching its auth flag.
    pub fn add_endpoint(&mut self, endpoint: EndpointDeclaration) {
        if endpoint.is_auth {
            self.authenticated_endpoints.push(endpoint);
        } else {
            self.endpoints.push(endpoint);
        }
    }

    /// Every endpoint once, by global name, in first-seen order.
    pub fn all_endpoints(&self) -> Vec<&EndpointDeclaration> {
        let mut seen = BTreeSet::new();
        self.endpoints
            .iter()
            .chain(&self.authenticated_endpoints)
            .filter(|endpoint| seen.insert(endpoint.global_name.as_str()))
            .collect()
    }

    /// Absorb the endpoints of a subsystem with the same name.
    pub fn merge(&mut self, other: Self) {
        self.endpoints.extend(other.endpoints);
        self.authenticated_endpoints.extend(other.authenticated_endpoints);
    }

    fn include_statements(&self, config: &GeneratorConfig) -> String {
        let mut includes: Vec<String> = self
            .all_endpoints()
            .iter()
            .map(|endpoint| {
                include_statement(&format!(
                    "{}AutoGen/SubSystems/{}/{}Request.h",
                    config.header_path, endpoint.owner, endpoint.global_name
                ))
            })
            .collect();
        if config.mode == GenerationMode::ServiceClient {
            includes.push(MICROSERVICE_INCLUDE.to_string());
        }
        includes.join("\n")
    }

    fn base_table(&self, config: &GeneratorConfig) -> Replacements {
        let microservice = config.mode == GenerationMode::ServiceClient;
        Replacements::from([
            ("exportMacro", config.export_macro.clone()),
            ("includeStatementPrefix", config.header_path.clone()),
            ("SubsystemName", self.subsystem_name.clone()),
            (
                "_assignMicroserviceId",
                if microservice {
                    format!("MicroserviceName = TEXT(\"{}\");", self.service_name)
                } else {
                    String::new()
                },
            ),
        ])
    }

    /// Tokens of `Beam{Subsystem}Api.h`.
    pub fn header_replacements(&self, config: &GeneratorConfig) -> Result<Replacements, GenError> {
        let microservice = config.mode == GenerationMode::ServiceClient;
        let mut table = self.base_table(config);
        table.insert("IncludeStatements", self.include_statements(config));
        table.insert(
            "_baseTypeDeclaration",
            if microservice { "UBeamMicroserviceClientSubsystem" } else { "UEngineSubsystem" }.to_string(),
        );
        table.insert(
            "DeclaredFederations",
            if microservice { String::new() } else { FEDERATIONS_PLACEHOLDER.to_string() },
        );

        let plain = &self.endpoints;
        let auth = &self.authenticated_endpoints;
        table.insert(
            "EndpointRawFunctionDeclarations",
            render_block(&[RAW_BP_DECLARATION, RAW_CPP_DECLARATION], plain, config)?,
        );
        table.insert(
            "AuthenticatedEndpointRawFunctionDeclarations",
            render_block(&[RAW_AUTH_BP_DECLARATION, RAW_AUTH_CPP_DECLARATION], auth, config)?,
        );
        table.insert(
            "EndpointLambdaBindableFunctionDeclarations",
            render_block(&[LAMBDA_DECLARATION], plain, config)?,
        );
        table.insert(
            "AuthenticatedEndpointLambdaBindableFunctionDeclarations",
            render_block(&[LAMBDA_AUTH_DECLARATION], auth, config)?,
        );
        table.insert(
            "EndpointUFunctionDeclarations",
            render_block(&[UFUNCTION_DECLARATION], plain, config)?,
        );
        table.insert(
            "AuthenticatedEndpointUFunctionDeclarations",
            render_block(&[UFUNCTION_AUTH_DECLARATION], auth, config)?,
        );
        Ok(table)
    }

    /// Tokens of `Beam{Subsystem}Api.cpp`.
    pub fn source_replacements(&self, config: &GeneratorConfig) -> Result<Replacements, GenError> {
        let (raw, raw_auth) = match config.mode {
            GenerationMode::ServiceClient => (
                [RAW_MS_BP_DEFINITION, RAW_MS_CPP_DEFINITION],
                [RAW_MS_AUTH_BP_DEFINITION, RAW_MS_AUTH_CPP_DEFINITION],
            ),
            GenerationMode::ObjectModel => (
                [RAW_BP_DEFINITION, RAW_CPP_DEFINITION],
                [RAW_AUTH_BP_DEFINITION, RAW_AUTH_CPP_DEFINITION],
            ),
        };

        let plain = &self.endpoints;
        let auth = &self.authenticated_endpoints;
        let mut table = self.base_table(config);
        table.insert("EndpointRawFunctionDeclarations", render_block(&raw, plain, config)?);
        table.insert("AuthenticatedEndpointRawFunctionDeclarations", render_block(&raw_auth, auth, config)?);
        table.insert(
            "EndpointLambdaBindableFunctionDeclarations",
            render_block(&[LAMBDA_DEFINITION], plain, config)?,
        );
        table.insert(
            "AuthenticatedEndpointLambdaBindableFunctionDeclarations",
            render_block(&[LAMBDA_AUTH_DEFINITION], auth, config)?,
        );
        table.insert("EndpointUFunctionDeclarations", render_block(&[UFUNCTION_DEFINITION], plain, config)?);
        table.insert(
            "AuthenticatedEndpointUFunctionDeclarations",
            render_block(&[UFUNCTION_AUTH_DEFINITION], auth, config)?,
        );
        Ok(table)
    }
}

/// Each endpoint renders `templates` back to back; endpoints are joined by
/// `"\n\t\t"`.
fn render_block(
    templates: &[Template],
    endpoints: &[EndpointDeclaration],
    config: &GeneratorConfig,
) -> Result<String, GenError> {
    let mut rendered = Vec::with_capacity(endpoints.len());
    for endpoint in endpoints {
        let table = endpoint.replacements(config);
        let mut text = String::new();
        for template in templates {
            text.push_str(&render(template, &table)?);
        }
        rendered.push(text);
    }
    Ok(rendered.join("\n\t\t"))
}

/// Declare every operation of every document, grouped into subsystems.
pub fn build_subsystems(
    builder: &EndpointBuilder<'_, '_>,
    documents: &[OpenApiDocument],
    naming: &EndpointNaming,
    config: &GeneratorConfig,
    synth: &mut WrapperSynthesizer,
    responses: &mut ResponseRegistry,
) -> Result<Vec<SubsystemDeclaration>, GenError> {
    let mut subsystems: Vec<SubsystemDeclaration> = Vec::new();

    for (index, doc) in documents.iter().enumerate() {
        let service = ServiceNaming::from_title(&doc.info.title, config.mode);
        let mut subsystem = SubsystemDeclaration::new(&service.name, service.subsystem_name(config.mode));

        for (path, item) in &doc.paths {
            for (verb, operation) in item.operations() {
                let Some(names) = naming.get(index, path, verb) else {
                    tracing::warn!(path = %path, verb = %verb, "Operation has no endpoint name, skipping.");
                    continue;
                };
                let site = OperationSite {
                    document: index,
                    path,
                    verb,
                    operation,
                    names,
                };
                subsystem.add_endpoint(builder.build(site, synth, responses)?);
            }
        }

        match subsystems
            .iter_mut()
            .find(|existing| existing.subsystem_name == subsystem.subsystem_name)
        {
            Some(existing) => {
                tracing::debug!(subsystem = %subsystem.subsystem_name, "Merging service into existing subsystem.");
                existing.merge(subsystem);
            }
            None => subsystems.push(subsystem),
        }
    }

    Ok(subsystems)
}
