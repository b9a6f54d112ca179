//! The fixed Swagger proxy definition submitted to API Gateway.
//!
//! Rendering is literal placeholder substitution over an immutable document;
//! three substitution points only, so no templating engine is involved.

/// Stamp written into the `info.version` field of every rendered definition.
/// A fixed literal, not the current time; API Gateway only requires the field
/// to be present.
pub const VERSION_DATE: &str = "2023-05-13T13:57:20Z";

/// Prefix of every gateway name this service creates. The list operation
/// recognizes its own gateways by this substring, so it must be rendered
/// verbatim into the definition's title field.
pub const TITLE_MARKER: &str = "QuantumPortal - ";

/// Swagger 2.0 document with two path entries, `/` and the catch-all
/// `/{proxy+}`, each an `http_proxy` passthrough integration to `{{url}}`.
/// The structure is what the provider expects on import; do not reshape it.
const PROXY_DEFINITION: &str = r#"
{
    "swagger": "2.0",
    "info": {
        "version": "{{version_date}}",
        "title": "{{title}}"
    },
    "basePath": "/",
    "schemes": [
        "https"
    ],
    "paths": {
        "/": {
            "get": {
                "parameters": [
                    {
                        "name": "proxy",
                        "in": "path",
                        "required": true,
                        "type": "string"
                    },
                    {
                        "name": "X-My-X-Forwarded-For",
                        "in": "header",
                        "required": false,
                        "type": "string"
                    }
                ],
                "responses": {},
                "x-amazon-apigateway-integration": {
                    "uri": "{{url}}/",
                    "responses": {
                        "default": {
                            "statusCode": "200"
                        }
                    },
                    "requestParameters": {
                        "integration.request.path.proxy": "method.request.path.proxy",
                        "integration.request.header.X-Forwarded-For": "method.request.header.X-My-X-Forwarded-For"
                    },
                    "passthroughBehavior": "when_no_match",
                    "httpMethod": "ANY",
                    "cacheNamespace": "irx7tm",
                    "cacheKeyParameters": [
                        "method.request.path.proxy"
                    ],
                    "type": "http_proxy"
                }
            }
        },
        "/{proxy+}": {
            "x-amazon-apigateway-any-method": {
                "produces": [
                    "application/json"
                ],
                "parameters": [
                    {
                        "name": "proxy",
                        "in": "path",
                        "required": true,
                        "type": "string"
                    },
                    {
                        "name": "X-My-X-Forwarded-For",
                        "in": "header",
                        "required": false,
                        "type": "string"
                    }
                ],
                "responses": {},
                "x-amazon-apigateway-integration": {
                    "uri": "{{url}}/{proxy}",
                    "responses": {
                        "default": {
                            "statusCode": "200"
                        }
                    },
                    "requestParameters": {
                        "integration.request.path.proxy": "method.request.path.proxy",
                        "integration.request.header.X-Forwarded-For": "method.request.header.X-My-X-Forwarded-For"
                    },
                    "passthroughBehavior": "when_no_match",
                    "httpMethod": "ANY",
                    "cacheNamespace": "irx7tm",
                    "cacheKeyParameters": [
                        "method.request.path.proxy"
                    ],
                    "type": "http_proxy"
                }
            }
        }
    }
}
"#;

/// Human-readable gateway title for a target URL; doubles as the list
/// operation's discovery key.
pub fn proxy_title(target_url: &str) -> String {
    format!("{TITLE_MARKER}{target_url}")
}

/// Short display name derived from the target URL. Kept for naming-convention
/// parity with the original provisioner; only used in logs.
pub fn display_name(target_url: &str) -> String {
    format!("QP-{}", target_url.replace('.', "-"))
}

/// Render the proxy definition for a target URL. `{{url}}` occurs twice, once
/// per path entry; both must carry the target verbatim.
pub fn render(target_url: &str) -> String {
    PROXY_DEFINITION
        .replace("{{version_date}}", VERSION_DATE)
        .replace("{{title}}", &proxy_title(target_url))
        .replace("{{url}}", target_url)
}
