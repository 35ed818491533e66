use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

const HTTP_METHODS: &[&str] = &[
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

fn main() {
    let openapi_path = Path::new("openapi.json");
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));

    println!("cargo:rerun-if-changed={}", openapi_path.display());
    println!("cargo:rerun-if-changed=build.rs");

    // Read the OpenAPI document
    let openapi_content = fs::read_to_string(openapi_path).expect("Failed to read openapi.json");
    let openapi: Value =
        serde_json::from_str(&openapi_content).expect("Failed to parse openapi.json");

    let operations = collect_operations(&openapi);

    // One object schema per operation with parameters; typify turns each into a struct.
    let json_schema = serde_json::json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "definitions": parameter_definitions(&operations)
    });

    let mut type_space = typify::TypeSpace::default();
    type_space
        .add_root_schema(serde_json::from_value(json_schema).expect("Failed to convert schema"))
        .expect("Failed to add schema to type space");

    let code = type_space.to_stream().to_string();
    let formatted = prettyplease_format(&code).unwrap_or(code);
    let types_code = strip_json_schema_docs(&formatted);
    fs::write(out_dir.join("types.rs"), types_code).expect("Failed to write types.rs");

    let table = generate_operation_table(&openapi, &operations);
    let table = prettyplease_format(&table).unwrap_or(table);
    fs::write(out_dir.join("operations.rs"), table).expect("Failed to write operations.rs");
}

fn prettyplease_format(code: &str) -> Option<String> {
    let syntax_tree = syn::parse_file(code).ok()?;
    Some(prettyplease::unparse(&syntax_tree))
}

/// A single operation read out of the `paths` object.
struct ApiOperation {
    id: String,
    path: String,
    method: String,
    summary: String,
    description: Option<String>,
    parameters: Vec<ApiParameter>,
}

struct ApiParameter {
    name: String,
    location: String,
    required: bool,
    schema: Value,
    description: Option<String>,
}

impl ApiOperation {
    fn const_name(&self) -> String {
        to_screaming_snake(&self.id)
    }

    fn params_type_name(&self) -> String {
        format!("{}Params", to_pascal(&self.id))
    }
}

/// Walk `paths` in document order and collect every operation with its parameters.
///
/// Path-level parameters are merged into each operation; `$ref`s into
/// `#/components/parameters` are resolved.
fn collect_operations(openapi: &Value) -> Vec<ApiOperation> {
    let paths = openapi
        .get("paths")
        .and_then(Value::as_object)
        .expect("OpenAPI must have paths");

    let mut operations = Vec::new();

    for (path, item) in paths {
        let Some(item) = item.as_object() else {
            continue;
        };
        let shared_params = item
            .get("parameters")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        for method in HTTP_METHODS {
            let Some(op) = item.get(*method).and_then(Value::as_object) else {
                continue;
            };

            let id = op
                .get("operationId")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| path.trim_start_matches('/').replace('/', "_"));
            let summary = op
                .get("summary")
                .and_then(Value::as_str)
                .unwrap_or(&id)
                .to_string();
            let description = op
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string);

            let op_params = op
                .get("parameters")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();

            let mut parameters: Vec<ApiParameter> = Vec::new();
            for raw in shared_params.iter().chain(op_params.iter()) {
                let Some(param) = resolve_ref(openapi, raw).and_then(parse_parameter) else {
                    continue;
                };
                // Operation-level parameters override path-level ones with the same name.
                parameters.retain(|p| !(p.name == param.name && p.location == param.location));
                parameters.push(param);
            }

            operations.push(ApiOperation {
                id,
                path: path.clone(),
                method: method.to_string(),
                summary,
                description,
                parameters,
            });
        }
    }

    operations
}

fn resolve_ref<'a>(openapi: &'a Value, value: &'a Value) -> Option<&'a Value> {
    match value.get("$ref").and_then(Value::as_str) {
        Some(reference) => {
            let pointer = reference.strip_prefix('#')?;
            openapi.pointer(pointer)
        }
        None => Some(value),
    }
}

fn parse_parameter(value: &Value) -> Option<ApiParameter> {
    let obj = value.as_object()?;
    let name = obj.get("name")?.as_str()?.to_string();
    let location = obj.get("in")?.as_str()?.to_string();
    // Path parameters are always required.
    let required = location == "path"
        || obj
            .get("required")
            .and_then(Value::as_bool)
            .unwrap_or(false);
    let schema = obj
        .get("schema")
        .cloned()
        .unwrap_or_else(|| serde_json::json!({ "type": "string" }));
    let description = obj
        .get("description")
        .and_then(Value::as_str)
        .map(str::to_string);

    Some(ApiParameter {
        name,
        location,
        required,
        schema,
        description,
    })
}

/// Build the JSON Schema `definitions` map: `<OperationId>Params` for each operation
/// that declares parameters.
fn parameter_definitions(operations: &[ApiOperation]) -> Map<String, Value> {
    let mut definitions = Map::new();

    for op in operations {
        if op.parameters.is_empty() {
            continue;
        }

        let mut properties = Map::new();
        let mut required = Vec::new();
        for param in &op.parameters {
            let mut schema = param.schema.clone();
            if let (Some(description), Some(obj)) = (&param.description, schema.as_object_mut()) {
                obj.insert("description".to_string(), Value::String(description.clone()));
            }
            // Titles would make typify emit a named type per field.
            if let Some(obj) = schema.as_object_mut() {
                obj.remove("title");
            }
            properties.insert(param.name.clone(), schema);
            if param.required {
                required.push(Value::String(param.name.clone()));
            }
        }

        definitions.insert(
            op.params_type_name(),
            serde_json::json!({
                "description": format!("Parameters of `{}` ({}).", op.path, op.summary),
                "type": "object",
                "properties": properties,
                "required": required,
            }),
        );
    }

    definitions
}

/// Render the static operation table, the declared server and the security scheme.
fn generate_operation_table(openapi: &Value, operations: &[ApiOperation]) -> String {
    let mut code = String::new();

    for op in operations {
        code.push_str(&format!("/// {}\n", one_line(&op.summary)));
        if let Some(description) = &op.description {
            code.push_str("///\n");
            code.push_str(&format!("/// {}\n", one_line(description)));
        }

        let mut params = String::new();
        for param in &op.parameters {
            params.push_str(&format!(
                "Parameter {{ name: {:?}, location: ParameterLocation::{}, required: {} }},\n",
                param.name,
                location_variant(&param.location),
                param.required,
            ));
        }

        code.push_str(&format!(
            "pub const {const_name}: Operation = Operation {{\n    id: {id:?},\n    path: {path:?},\n    method: HttpMethod::{method},\n    summary: {summary:?},\n    parameters: &[\n{params}],\n}};\n\n",
            const_name = op.const_name(),
            id = op.id,
            path = op.path,
            method = to_pascal(&op.method),
            summary = op.summary,
            params = params,
        ));
    }

    let all = operations
        .iter()
        .map(|op| op.const_name())
        .collect::<Vec<_>>()
        .join(", ");
    code.push_str("/// Every operation declared by the API, in document order.\n");
    code.push_str(&format!("pub const ALL: &[Operation] = &[{all}];\n\n"));

    code.push_str(&generate_server(openapi));
    code.push_str(&generate_security_scheme(openapi));

    let info = openapi.get("info");
    let title = info
        .and_then(|i| i.get("title"))
        .and_then(Value::as_str)
        .unwrap_or("api");
    let version = info
        .and_then(|i| i.get("version"))
        .and_then(Value::as_str)
        .unwrap_or("0.0.0");
    code.push_str(&format!(
        "/// Title of the API document the table was generated from.\npub const API_TITLE: &str = {title:?};\n\n"
    ));
    code.push_str(&format!(
        "/// Version of the API document the table was generated from.\npub const API_VERSION: &str = {version:?};\n"
    ));

    code
}

fn generate_server(openapi: &Value) -> String {
    let server = openapi
        .get("servers")
        .and_then(Value::as_array)
        .and_then(|servers| servers.first());

    let url = server
        .and_then(|s| s.get("url"))
        .and_then(Value::as_str)
        .unwrap_or("/");

    let mut variables = String::new();
    if let Some(vars) = server
        .and_then(|s| s.get("variables"))
        .and_then(Value::as_object)
    {
        for (name, var) in vars {
            let default = var.get("default").and_then(Value::as_str).unwrap_or("");
            variables.push_str(&format!(
                "ServerVariable {{ name: {name:?}, default: {default:?} }},\n"
            ));
        }
    }

    format!(
        "/// First server declared by the API document.\npub const DEFAULT_SERVER: ServerDefinition = ServerDefinition {{\n    url: {url:?},\n    variables: &[\n{variables}],\n}};\n\n"
    )
}

fn generate_security_scheme(openapi: &Value) -> String {
    // The first requirement of the top-level `security` list wins.
    let scheme = openapi
        .get("security")
        .and_then(Value::as_array)
        .and_then(|reqs| reqs.first())
        .and_then(Value::as_object)
        .and_then(|req| req.keys().next())
        .and_then(|name| {
            openapi
                .get("components")
                .and_then(|c| c.get("securitySchemes"))
                .and_then(|s| s.get(name))
        });

    let rendered = scheme.and_then(|scheme| {
        let kind = scheme.get("type").and_then(Value::as_str)?;
        match kind {
            "apiKey" => {
                let name = scheme.get("name").and_then(Value::as_str)?;
                let location = match scheme.get("in").and_then(Value::as_str)? {
                    "query" => "Query",
                    "header" => "Header",
                    _ => return None,
                };
                Some(format!(
                    "SecurityScheme::ApiKey {{ name: {name:?}, location: ApiKeyLocation::{location} }}"
                ))
            }
            "http" => match scheme.get("scheme").and_then(Value::as_str)? {
                s if s.eq_ignore_ascii_case("basic") => Some("SecurityScheme::Basic".to_string()),
                s if s.eq_ignore_ascii_case("bearer") => Some("SecurityScheme::Bearer".to_string()),
                _ => None,
            },
            "oauth2" => Some("SecurityScheme::Bearer".to_string()),
            _ => None,
        }
    });

    let value = match rendered {
        Some(scheme) => format!("Some({scheme})"),
        None => "None".to_string(),
    };

    format!(
        "/// Security scheme the API document declares for its operations.\npub const SECURITY_SCHEME: Option<SecurityScheme> = {value};\n\n"
    )
}

fn location_variant(location: &str) -> &'static str {
    match location {
        "path" => "Path",
        "header" => "Header",
        "cookie" => "Cookie",
        _ => "Query",
    }
}

fn one_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `getAddressInformation` -> `GET_ADDRESS_INFORMATION`
fn to_screaming_snake(id: &str) -> String {
    let mut out = String::with_capacity(id.len() + 8);
    let mut prev_lower = false;
    for ch in id.chars() {
        if !ch.is_ascii_alphanumeric() {
            out.push('_');
            prev_lower = false;
            continue;
        }
        if ch.is_ascii_uppercase() && prev_lower {
            out.push('_');
        }
        prev_lower = ch.is_ascii_lowercase() || ch.is_ascii_digit();
        out.push(ch.to_ascii_uppercase());
    }
    out
}

/// `getAddressInformation` -> `GetAddressInformation`
fn to_pascal(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    let mut upper_next = true;
    for ch in id.chars() {
        if !ch.is_ascii_alphanumeric() {
            upper_next = true;
            continue;
        }
        if upper_next {
            out.push(ch.to_ascii_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// Strip JSON schema documentation blocks from generated code.
///
/// Removes collapsible `<details>` blocks containing raw JSON schemas that bloat
/// the generated file. Also marks code examples with `ignore` to prevent doctest
/// failures on external crate references.
fn strip_json_schema_docs(code: &str) -> String {
    let mut result = Vec::new();
    let mut in_details_block = false;

    for line in code.lines() {
        let trimmed = line.trim();

        if trimmed.starts_with("///")
            && trimmed.contains("<details>")
            && trimmed.contains("JSON schema")
        {
            in_details_block = true;
            continue;
        }

        if in_details_block && trimmed.starts_with("///") && trimmed.contains("</details>") {
            in_details_block = false;
            continue;
        }

        if in_details_block {
            continue;
        }

        if trimmed == "/// ```" || trimmed == "///```" || trimmed == "```" {
            result.push(line.replace("```", "```ignore"));
        } else {
            result.push(line.to_string());
        }
    }

    result.join("\n")
}
