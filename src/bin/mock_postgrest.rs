//! Local stand-in for the catalog's PostgREST API
//!
//! Serves a seeded in-memory catalog on the routes the client uses, so the
//! CLI and browser can be exercised without a hosted project:
//!
//! ```text
//! PROMPT_LIBRARY_URL=http://127.0.0.1:54321 PROMPT_LIBRARY_ANON_KEY=dev plib ls
//! ```

use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer, Result};
use chrono::{TimeZone, Utc};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;

use prompt_library::model::{Category, OutputStatus, PromptRecord, PromptType, Tool};
use prompt_library::store::{MemoryStore, PromptStore, PAGE_SIZE};
use prompt_library::FetchError;

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";
const DEFAULT_ADDR: &str = "127.0.0.1:54321";

type Params = web::Query<HashMap<String, String>>;

#[derive(Debug, Deserialize)]
struct FavoriteBody {
    is_favorite: bool,
}

#[derive(Debug, Deserialize)]
struct IncrementBody {
    prompt_id: String,
}

fn tool(name: &str, color: &str) -> Tool {
    Tool {
        id: Some(name.to_lowercase()),
        name: name.to_string(),
        color: Some(color.to_string()),
    }
}

fn category(name: &str) -> Category {
    Category {
        id: Some(name.to_lowercase()),
        name: name.to_string(),
        color: None,
        image_url: None,
    }
}

fn seed() -> MemoryStore {
    let tools = vec![
        tool("ChatGPT", "#10a37f"),
        tool("Claude", "#d97706"),
        tool("Midjourney", "#6366f1"),
    ];
    let categories = vec![category("Writing"), category("Design"), category("Coding")];

    let samples: [(&str, &str, usize, usize, &str, Option<f64>, &str); 6] = [
        ("1", "Cold outreach email", 0, 0, "Write a short cold email to {company} about {offer}.", Some(4.5), "Successful"),
        ("2", "Minimal logo concept", 2, 1, "flat vector logo, single color, negative space, {brand}", Some(4.0), "So-So"),
        ("3", "Refactor to iterators", 1, 2, "Rewrite this loop using iterator adapters:\n{code}", Some(5.0), "Successful"),
        ("4", "Blog outline", 0, 0, "Outline a 1500 word post on {topic} with five sections.", Some(3.0), ""),
        ("5", "Product hero shot", 2, 1, "studio product photo, soft light, {product} --ar 16:9", None, "Failure"),
        ("6", "Explain a stack trace", 1, 2, "Explain this error and suggest a fix:\n{trace}", Some(4.0), "Successful"),
    ];

    let records = samples
        .iter()
        .enumerate()
        .map(|(i, (id, title, t, c, body, rating, status))| {
            let mut record = PromptRecord::new(*id, *title);
            record.prompt_text = body.to_string();
            record.rating = *rating;
            record.usage_count = (i as u64 + 1) * 3;
            record.created_at = Utc.with_ymd_and_hms(2024, 3, 1 + i as u32, 9, 0, 0).single();
            record.updated_at = record.created_at;
            record.tags = vec![categories[*c].name.to_lowercase(), "sample".to_string()];
            record.output_status = (!status.is_empty()).then(|| OutputStatus::new(*status));
            record.version = Some("1".to_string());
            record.tool = Some(tools[*t].clone());
            record.category = Some(categories[*c].clone());
            record.prompt_type = Some(PromptType {
                id: None,
                name: "Template".to_string(),
            });
            if *id == "2" {
                record.attachment_filename = Some("logo-concept.png".to_string());
            }
            record
        })
        .collect();

    MemoryStore::new(records).with_reference_lists(tools, categories)
}

/// PostgREST-style `eq.value` filter
fn filter_value<'a>(params: &'a HashMap<String, String>, column: &str, op: &str) -> Option<&'a str> {
    params
        .get(column)
        .and_then(|v| v.strip_prefix(op))
        .and_then(|v| v.strip_prefix('.'))
}

fn error_response(error: FetchError) -> HttpResponse {
    match error {
        FetchError::NotFound { id } => HttpResponse::NotFound().json(json!({
            "code": "PGRST116",
            "message": format!("no prompt with id {}", id),
        })),
        other => HttpResponse::InternalServerError().json(json!({ "message": other.to_string() })),
    }
}

fn authorized(req: &HttpRequest) -> bool {
    req.headers().contains_key("apikey")
}

async fn get_prompts(req: HttpRequest, store: web::Data<MemoryStore>, params: Params) -> Result<HttpResponse> {
    if !authorized(&req) {
        return Ok(HttpResponse::Unauthorized().json(json!({ "message": "No API key found in request" })));
    }

    if let Some(id) = filter_value(&params, "id", "eq") {
        let single = req
            .headers()
            .get("accept")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains(SINGLE_OBJECT));
        return Ok(match store.get_prompt(id).await {
            Ok(record) if single => HttpResponse::Ok().json(record),
            Ok(record) => HttpResponse::Ok().json(vec![record]),
            // Single-object requests that match nothing answer 406
            Err(FetchError::NotFound { .. }) if single => HttpResponse::NotAcceptable().json(json!({
                "code": "PGRST116",
                "message": "JSON object requested, multiple (or no) rows returned",
            })),
            Err(FetchError::NotFound { .. }) => HttpResponse::Ok().json(Vec::<PromptRecord>::new()),
            Err(e) => error_response(e),
        });
    }

    if let Some(category) = filter_value(&params, "categories.name", "eq") {
        let exclude = filter_value(&params, "id", "neq").unwrap_or_default();
        return Ok(match store.related_prompts(category, exclude).await {
            Ok(records) => HttpResponse::Ok().json(records),
            Err(e) => error_response(e),
        });
    }

    let offset: u32 = params.get("offset").and_then(|v| v.parse().ok()).unwrap_or(0);
    let page = offset / PAGE_SIZE + 1;
    Ok(match store.list_prompts(page).await {
        Ok(records) => HttpResponse::Ok().json(records),
        Err(e) => error_response(e),
    })
}

async fn count_prompts(req: HttpRequest, store: web::Data<MemoryStore>) -> Result<HttpResponse> {
    if !authorized(&req) {
        return Ok(HttpResponse::Unauthorized().finish());
    }
    Ok(match store.count_prompts().await {
        Ok(0) => HttpResponse::Ok().insert_header(("Content-Range", "*/0")).finish(),
        Ok(total) => HttpResponse::Ok()
            .insert_header(("Content-Range", format!("0-0/{}", total)))
            .finish(),
        Err(e) => error_response(e),
    })
}

async fn update_prompt(
    req: HttpRequest,
    store: web::Data<MemoryStore>,
    params: Params,
    body: web::Json<FavoriteBody>,
) -> Result<HttpResponse> {
    if !authorized(&req) {
        return Ok(HttpResponse::Unauthorized().finish());
    }
    let Some(id) = filter_value(&params, "id", "eq") else {
        return Ok(HttpResponse::BadRequest().json(json!({ "message": "missing id filter" })));
    };
    Ok(match store.set_favorite(id, body.is_favorite).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => error_response(e),
    })
}

async fn increment_view_count(
    req: HttpRequest,
    store: web::Data<MemoryStore>,
    body: web::Json<IncrementBody>,
) -> Result<HttpResponse> {
    if !authorized(&req) {
        return Ok(HttpResponse::Unauthorized().finish());
    }
    Ok(match store.increment_view_count(&body.prompt_id).await {
        Ok(count) => HttpResponse::Ok().json(count),
        Err(e) => error_response(e),
    })
}

async fn list_tools(store: web::Data<MemoryStore>) -> Result<HttpResponse> {
    Ok(match store.list_tools().await {
        Ok(tools) => HttpResponse::Ok().json(tools),
        Err(e) => error_response(e),
    })
}

async fn list_categories(store: web::Data<MemoryStore>) -> Result<HttpResponse> {
    Ok(match store.list_categories().await {
        Ok(categories) => HttpResponse::Ok().json(categories),
        Err(e) => error_response(e),
    })
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let addr = std::env::var("MOCK_POSTGREST_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let store = web::Data::new(seed());

    println!("Mock PostgREST listening on http://{}", addr);

    HttpServer::new(move || {
        App::new()
            .app_data(store.clone())
            .route("/rest/v1/prompts", web::get().to(get_prompts))
            .route("/rest/v1/prompts", web::head().to(count_prompts))
            .route("/rest/v1/prompts", web::patch().to(update_prompt))
            .route("/rest/v1/rpc/increment_view_count", web::post().to(increment_view_count))
            .route("/rest/v1/ai_tools", web::get().to(list_tools))
            .route("/rest/v1/categories", web::get().to(list_categories))
            .route(
                "/",
                web::get().to(|| async { HttpResponse::Ok().body("Prompt Library Mock PostgREST v1.0") }),
            )
    })
    .bind(addr)?
    .run()
    .await
}
