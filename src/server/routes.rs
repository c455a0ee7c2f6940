use crate::server::api;
use crate::server::AppState;

pub struct HttpResponse {
    pub status_code: u16,
    pub status_text: &'static str,
    pub content_type: &'static str,
    pub body: String,
}

fn ok_json(body: String) -> HttpResponse {
    HttpResponse {
        status_code: 200,
        status_text: "OK",
        content_type: "application/json",
        body,
    }
}

pub fn route_request(method: &str, path: &str, body: &str, state: &AppState) -> HttpResponse {
    let path = path.split('?').next().unwrap_or(path);
    match (method, path) {
        ("GET", "/api/health") => match api::health_payload() {
            Ok(payload) => ok_json(payload),
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        ("GET", "/api/routes") => match api::routes_payload() {
            Ok(payload) => ok_json(payload),
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        ("POST", "/api/loadout/parse") => {
            match api::loadout_parse_payload(body, &state.config) {
                Ok(payload) => ok_json(payload),
                Err(api::PayloadError::Parse(err)) => {
                    error_response(400, "Bad Request", &format!("Invalid request body: {err}"))
                }
                Err(api::PayloadError::Validation(response)) => validation_response(&response),
            }
        }
        ("POST", "/api/evaluate") => {
            match api::evaluate_payload(body, &state.config, &*state.provider) {
                Ok(payload) => ok_json(payload),
                Err(api::PayloadError::Parse(err)) => {
                    error_response(400, "Bad Request", &format!("Invalid request body: {err}"))
                }
                Err(api::PayloadError::Validation(response)) => validation_response(&response),
            }
        }
        _ => error_response(404, "Not Found", "Route not found"),
    }
}

fn validation_response(response: &api::ValidationErrorResponse) -> HttpResponse {
    match serde_json::to_string_pretty(response) {
        Ok(body) => HttpResponse {
            status_code: 400,
            status_text: "Bad Request",
            content_type: "application/json",
            body,
        },
        Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
    }
}

fn error_response(status_code: u16, status_text: &'static str, message: &str) -> HttpResponse {
    HttpResponse {
        status_code,
        status_text,
        content_type: "application/json",
        body: format!(
            "{{\n  \"status\": \"error\",\n  \"message\": {}\n}}",
            serde_json::to_string(message).unwrap_or_else(|_| "\"Unknown error\"".to_string())
        ),
    }
}
