use std::path::PathBuf;

use actix_web::{delete, get, put, web, App, HttpResponse, HttpServer, Responder};
use clap::Parser;
use serde::Deserialize;
use stoch_core::io::read_training_chunks;
use stoch_core::{Error, OsEntropy, SeededEntropy, StochModel};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

use config::ServerConfig;

/// Response header carrying the number of meaningful generated bytes.
const LOGICAL_LENGTH_HEADER: &str = "X-Logical-Length";

#[derive(Parser, Debug)]
#[command(version, about = "HTTP front end for a byte-level Markov model")]
struct Args {
	/// TOML configuration file
	#[arg(long, env = "STOCH_CONFIG")]
	config: Option<PathBuf>,
}

/// Query parameters for the `/v1/generate` endpoint
#[derive(Deserialize)]
struct GenerateParams {
	size: Option<usize>,
	/// Reproducible output when set, OS entropy otherwise
	seed: Option<u64>,
	/// Return only the bytes before the terminator
	trim: Option<bool>,
}

struct SharedData {
	model: StochModel,
	default_size: usize,
	max_size: usize,
}

fn error_response(error: &Error) -> HttpResponse {
	let mut response = match error {
		Error::InvalidArgument(_) | Error::CounterOverflow { .. } | Error::Config(_) => HttpResponse::BadRequest(),
		Error::RandomnessUnavailable(_) => HttpResponse::ServiceUnavailable(),
	};
	response.body(error.to_string())
}

/// HTTP PUT endpoint `/v1/train`
///
/// Trains the model on the raw request body. Successive requests continue
/// the same chain.
#[put("/v1/train")]
async fn put_train(data: web::Data<SharedData>, body: web::Bytes) -> impl Responder {
	match data.model.train(&body) {
		Ok(n) => HttpResponse::Ok().body(format!("{n} bytes trained")),
		Err(e) => error_response(&e),
	}
}

/// HTTP GET endpoint `/v1/generate`
///
/// Returns `size` generated bytes (or only the meaningful ones with
/// `trim=true`); the logical length is sent in `X-Logical-Length`.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<SharedData>, query: web::Query<GenerateParams>) -> impl Responder {
	let size = query.size.unwrap_or(data.default_size);
	if size > data.max_size {
		return HttpResponse::BadRequest().body(format!("size must not exceed {}", data.max_size));
	}

	let result = match query.seed {
		Some(seed) => data.model.generate(size, &mut SeededEntropy::new(seed)),
		None => data.model.generate(size, &mut OsEntropy),
	};

	match result {
		Ok(generated) => {
			let logical_len = generated.logical_len;
			let body = if query.trim.unwrap_or(false) {
				generated.meaningful().to_vec()
			} else {
				generated.bytes
			};
			HttpResponse::Ok()
				.content_type("application/octet-stream")
				.insert_header((LOGICAL_LENGTH_HEADER, logical_len.to_string()))
				.body(body)
		}
		Err(e) => error_response(&e),
	}
}

#[delete("/v1/model")]
async fn delete_model(data: web::Data<SharedData>) -> impl Responder {
	data.model.reset();
	HttpResponse::Ok().body("Model reset")
}

#[get("/v1/stats")]
async fn get_stats(data: web::Data<SharedData>) -> impl Responder {
	HttpResponse::Ok().json(data.model.stats())
}

fn routes(cfg: &mut web::ServiceConfig) {
	cfg.service(put_train)
		.service(get_generated)
		.service(delete_model)
		.service(get_stats);
}

fn init_tracing() {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.with_writer(std::io::stderr)
		.init();
}

/// Main entry point for the server.
///
/// Builds the model from the configuration, optionally trains it on the
/// preload path, and serves it over HTTP. The model is internally locked,
/// so it is shared between workers without an outer `Mutex`.
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
	init_tracing();
	let args = Args::parse();
	let config = ServerConfig::load(args.config.as_deref())?;

	let model = StochModel::new(config.model.clone())?;
	if let Some(path) = &config.preload {
		for chunk in read_training_chunks(path, None)? {
			model.train(&chunk)?;
		}
		info!(path = %path.display(), grand_total = model.stats().grand_total, "preloaded training data");
	}

	let shared_data = web::Data::new(SharedData {
		model,
		default_size: config.default_size,
		max_size: config.max_size,
	});
	let max_train_bytes = config.max_train_bytes;

	info!(host = %config.host, port = config.port, "listening");
	HttpServer::new(move || {
		App::new()
			.app_data(shared_data.clone())
			.app_data(web::PayloadConfig::new(max_train_bytes))
			.configure(routes)
	})
		.bind((config.host.as_str(), config.port))?
		.run()
		.await?;

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use actix_web::http::StatusCode;
	use actix_web::test;
	use stoch_core::ModelStats;

	fn shared() -> web::Data<SharedData> {
		web::Data::new(SharedData {
			model: StochModel::default(),
			default_size: 16,
			max_size: 64,
		})
	}

	#[actix_web::test]
	async fn test_generate_on_empty_model() {
		let app = test::init_service(App::new().app_data(shared()).configure(routes)).await;
		let req = test::TestRequest::get().uri("/v1/generate?size=8").to_request();
		let resp = test::call_service(&app, req).await;

		assert_eq!(resp.status(), StatusCode::OK);
		assert_eq!(resp.headers().get(LOGICAL_LENGTH_HEADER).unwrap(), "0");
		let body = test::read_body(resp).await;
		assert_eq!(body.as_ref(), &[0u8; 8]);
	}

	#[actix_web::test]
	async fn test_train_then_generate_trimmed() {
		let data = shared();
		let app = test::init_service(App::new().app_data(data.clone()).configure(routes)).await;

		for _ in 0..5 {
			let req = test::TestRequest::put().uri("/v1/train").set_payload("A\0").to_request();
			let resp = test::call_service(&app, req).await;
			assert_eq!(resp.status(), StatusCode::OK);
		}
		assert_eq!(data.model.stats().grand_total, 10);

		let req = test::TestRequest::get().uri("/v1/generate?size=8&seed=1&trim=true").to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::OK);
		let logical: usize = resp.headers().get(LOGICAL_LENGTH_HEADER).unwrap().to_str().unwrap().parse().unwrap();
		let body = test::read_body(resp).await;
		assert_eq!(body.len(), logical);
		assert!(body.as_ref() == b"A" || body.is_empty());
	}

	#[actix_web::test]
	async fn test_default_and_oversized_requests() {
		let app = test::init_service(App::new().app_data(shared()).configure(routes)).await;

		let req = test::TestRequest::get().uri("/v1/generate").to_request();
		let body = test::call_and_read_body(&app, req).await;
		assert_eq!(body.len(), 16);

		let req = test::TestRequest::get().uri("/v1/generate?size=0").to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

		let req = test::TestRequest::get().uri("/v1/generate?size=65").to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
	}

	#[actix_web::test]
	async fn test_reset_and_stats() {
		let data = shared();
		let app = test::init_service(App::new().app_data(data.clone()).configure(routes)).await;

		let req = test::TestRequest::put().uri("/v1/train").set_payload("hello").to_request();
		test::call_service(&app, req).await;

		let req = test::TestRequest::get().uri("/v1/stats").to_request();
		let stats: ModelStats = test::call_and_read_body_json(&app, req).await;
		assert_eq!(stats.grand_total, 5);
		assert_eq!(stats.cursor, b'o');

		let req = test::TestRequest::delete().uri("/v1/model").to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
		assert_eq!(data.model.stats().grand_total, 0);
	}

	#[actix_web::test]
	async fn test_overflow_is_bad_request() {
		let config = stoch_core::ModelConfig::default().with_counter_limit(3).unwrap();
		let data = web::Data::new(SharedData {
			model: StochModel::new(config).unwrap(),
			default_size: 16,
			max_size: 64,
		});
		let app = test::init_service(App::new().app_data(data).configure(routes)).await;

		let req = test::TestRequest::put().uri("/v1/train").set_payload("toolong").to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
	}
}
