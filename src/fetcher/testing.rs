//! Scripted connector for exercising the fetch layer without a network

use crate::fetcher::transport::{Connector, Endpoint, RawResponse, Transport};
use crate::{ConnectionError, TransportError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// A scripted response, or the kind of I/O failure to raise instead
pub type Scripted = std::result::Result<RawResponse, std::io::ErrorKind>;

/// Responses to hand out and everything the client did
#[derive(Default)]
pub struct Script {
    pub responses: VecDeque<Scripted>,
    pub connects: Vec<Endpoint>,
    pub requests: Vec<(Endpoint, String, HeaderMap)>,
}

#[derive(Clone, Default)]
pub struct ScriptedConnector {
    pub script: Arc<Mutex<Script>>,
}

impl ScriptedConnector {
    pub fn with_responses(responses: Vec<Scripted>) -> Self {
        let connector = Self::default();
        connector.script.lock().unwrap().responses = responses.into();
        connector
    }
}

pub struct ScriptedTransport {
    endpoint: Endpoint,
    script: Arc<Mutex<Script>>,
}

#[async_trait]
impl Connector for ScriptedConnector {
    type Transport = ScriptedTransport;

    async fn connect(&self, endpoint: &Endpoint) -> Result<ScriptedTransport, ConnectionError> {
        self.script.lock().unwrap().connects.push(endpoint.clone());
        Ok(ScriptedTransport {
            endpoint: endpoint.clone(),
            script: self.script.clone(),
        })
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(
        &mut self,
        target: &str,
        headers: &HeaderMap,
    ) -> Result<RawResponse, TransportError> {
        let mut script = self.script.lock().unwrap();
        script
            .requests
            .push((self.endpoint.clone(), target.to_string(), headers.clone()));
        match script.responses.pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(kind)) => Err(std::io::Error::new(kind, "scripted failure").into()),
            None => Err(std::io::Error::new(std::io::ErrorKind::Other, "script exhausted").into()),
        }
    }
}

pub fn response(status: u16, headers: &[(&'static str, &str)], body: &str) -> Scripted {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        map.insert(*name, HeaderValue::from_str(value).unwrap());
    }
    Ok(RawResponse {
        status,
        reason: "Reason".to_string(),
        headers: map,
        body: body.as_bytes().to_vec(),
    })
}
