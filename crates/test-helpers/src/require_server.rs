// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use actix_web::{dev::ServerHandle, web, App, HttpResponse, HttpServer, Responder};
use anyhow::{Context, Result};
use fhe_oracle::SignedRequire;
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
};
use tracing::debug;

/// How the fake require store answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequireServerMode {
    /// Keeps whatever is PUT and serves it back on GET.
    Store,
    /// Answers every request with this status.
    AlwaysFail(u16),
    /// Serves stored records with the value flipped and the signature kept.
    Tampered,
}

struct ServerState {
    mode: RequireServerMode,
    records: Mutex<HashMap<String, SignedRequire>>,
    gets: AtomicUsize,
    puts: AtomicUsize,
}

/// In-process HTTP require store on an ephemeral port. Must be started from
/// an actix runtime (`#[actix_web::test]`).
pub struct RequireServer {
    base_url: String,
    state: web::Data<ServerState>,
    handle: ServerHandle,
}

async fn get_require(state: web::Data<ServerState>, key: web::Path<String>) -> impl Responder {
    state.gets.fetch_add(1, Ordering::SeqCst);
    debug!(key = %key, "GET require");
    if let RequireServerMode::AlwaysFail(code) = state.mode {
        return fail(code);
    }
    let record = state
        .records
        .lock()
        .ok()
        .and_then(|records| records.get(key.as_str()).cloned());
    match record {
        Some(mut record) => {
            if state.mode == RequireServerMode::Tampered {
                record.value = !record.value;
            }
            HttpResponse::Ok().json(record)
        }
        None => HttpResponse::NotFound().finish(),
    }
}

async fn put_require(
    state: web::Data<ServerState>,
    key: web::Path<String>,
    body: web::Json<SignedRequire>,
) -> impl Responder {
    state.puts.fetch_add(1, Ordering::SeqCst);
    debug!(key = %key, "PUT require");
    if let RequireServerMode::AlwaysFail(code) = state.mode {
        return fail(code);
    }
    if let Ok(mut records) = state.records.lock() {
        records.insert(key.into_inner(), body.into_inner());
    }
    HttpResponse::Ok().finish()
}

fn fail(code: u16) -> HttpResponse {
    let status = actix_web::http::StatusCode::from_u16(code)
        .unwrap_or(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR);
    HttpResponse::build(status).finish()
}

impl RequireServer {
    pub async fn start(mode: RequireServerMode) -> Result<Self> {
        let state = web::Data::new(ServerState {
            mode,
            records: Mutex::new(HashMap::new()),
            gets: AtomicUsize::new(0),
            puts: AtomicUsize::new(0),
        });

        let app_state = state.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(app_state.clone())
                .route("/require/{key}", web::get().to(get_require))
                .route("/require/{key}", web::put().to(put_require))
        })
        .workers(1)
        .bind(("127.0.0.1", 0))?;

        let addr = *server
            .addrs()
            .first()
            .context("require server did not bind")?;
        let server = server.run();
        let handle = server.handle();
        actix_web::rt::spawn(server);

        Ok(Self {
            base_url: format!("http://{addr}"),
            state,
            handle,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Plant a record as if another node had published it.
    pub fn seed(&self, key: &str, record: SignedRequire) {
        if let Ok(mut records) = self.state.records.lock() {
            records.insert(key.to_string(), record);
        }
    }

    pub fn record(&self, key: &str) -> Option<SignedRequire> {
        self.state
            .records
            .lock()
            .ok()
            .and_then(|records| records.get(key).cloned())
    }

    pub fn gets(&self) -> usize {
        self.state.gets.load(Ordering::SeqCst)
    }

    pub fn puts(&self) -> usize {
        self.state.puts.load(Ordering::SeqCst)
    }

    pub async fn stop(&self) {
        self.handle.stop(true).await;
    }
}
