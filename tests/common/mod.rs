use async_trait::async_trait;
use lotus_autosell::core::kernel::{HttpRequest, HttpResponse, HttpTransport};
use lotus_autosell::ExchangeError;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Answers by URL path; each path replays its queue, then repeats the last body
#[derive(Default)]
pub struct RoutedTransport {
    routes: Mutex<HashMap<String, VecDeque<String>>>,
    sent: Mutex<Vec<HttpRequest>>,
}

impl RoutedTransport {
    pub fn route(self, path: &str, bodies: &[&str]) -> Self {
        self.routes.lock().unwrap().insert(
            path.to_string(),
            bodies.iter().map(|b| b.to_string()).collect(),
        );
        self
    }

    pub fn sent_to(&self, path: &str) -> Vec<HttpRequest> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|r| path_of(&r.url) == path)
            .cloned()
            .collect()
    }
}

fn path_of(url: &str) -> String {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let path = without_scheme
        .find('/')
        .map_or("", |start| &without_scheme[start..]);
    path.split('?').next().unwrap_or_default().to_string()
}

#[async_trait]
impl HttpTransport for RoutedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ExchangeError> {
        let path = path_of(&request.url);
        self.sent.lock().unwrap().push(request);

        let mut routes = self.routes.lock().unwrap();
        let queue = routes
            .get_mut(&path)
            .ok_or_else(|| ExchangeError::NetworkError(format!("no route for {}", path)))?;
        let body = if queue.len() > 1 {
            queue.pop_front().unwrap_or_default()
        } else {
            queue.front().cloned().unwrap_or_default()
        };
        Ok(HttpResponse { status: 200, body })
    }
}
