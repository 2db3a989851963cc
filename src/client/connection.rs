//! A single Bolt connection: handshake, authentication, queries.

use std::io;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};

use super::handshake::client_handshake;
use crate::chunk::{ChunkReader, ChunkWriter};
use crate::config::ConnectionConfig;
use crate::error::{BoltError, BoltResult};
use crate::hydration::Hydrator;
use crate::message::{ClientMessage, ServerMessage, decode_server_message};
use crate::packstream::{Dict, Value};
use crate::types::{BoltDict, BoltValue};
use crate::version::{CLIENT_PROPOSALS, Version};

/// The outcome of RUN followed by PULL.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// Column names from the RUN response.
    pub keys: Vec<String>,
    pub records: Vec<Vec<BoltValue>>,
    /// Metadata from the final SUCCESS.
    pub summary: BoltDict,
}

/// A client connection over any byte stream.
///
/// Requests are sent one at a time and each waits for its response. When
/// the server answers with FAILURE the connection sends RESET before
/// returning the error, so it stays usable. Transport and decoding errors
/// leave it defunct.
pub struct Connection<S> {
    reader: ChunkReader<ReadHalf<S>>,
    writer: ChunkWriter<WriteHalf<S>>,
    hydrator: Hydrator,
    database: Option<String>,
    server_agent: Option<String>,
    in_transaction: bool,
    defunct: bool,
}

impl Connection<TcpStream> {
    /// Opens a TCP connection and brings it to the ready state.
    pub async fn connect(addr: impl ToSocketAddrs, config: &ConnectionConfig) -> BoltResult<Self> {
        let connect = TcpStream::connect(addr);
        let stream = match config.get_connect_timeout() {
            Some(limit) => tokio::time::timeout(limit, connect).await.map_err(|_| {
                io::Error::new(io::ErrorKind::TimedOut, "timed out connecting to Bolt server")
            })??,
            None => connect.await?,
        };
        stream.set_nodelay(true)?;
        Self::open(stream, config).await
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> Connection<S> {
    /// Performs the handshake and authentication over an existing stream.
    pub async fn open(mut stream: S, config: &ConnectionConfig) -> BoltResult<Self> {
        let version = client_handshake(&mut stream, &CLIENT_PROPOSALS).await?;
        let (rh, wh) = tokio::io::split(stream);

        let mut conn = Self {
            reader: ChunkReader::with_max_message_size(rh, config.get_max_message_size()),
            writer: ChunkWriter::with_max_chunk_size(wh, config.get_max_chunk_size()),
            hydrator: Hydrator::for_version(version),
            database: config.get_database().map(str::to_owned),
            server_agent: None,
            in_transaction: false,
            defunct: false,
        };
        conn.authenticate(config).await?;
        Ok(conn)
    }

    /// The negotiated protocol version.
    pub fn version(&self) -> Version {
        self.hydrator.version()
    }

    /// The `server` entry of the HELLO response.
    pub fn server_agent(&self) -> Option<&str> {
        self.server_agent.as_deref()
    }

    pub fn hydrator(&self) -> &Hydrator {
        &self.hydrator
    }

    pub fn is_defunct(&self) -> bool {
        self.defunct
    }

    async fn authenticate(&mut self, config: &ConnectionConfig) -> BoltResult<()> {
        let version = self.version();
        let user_agent = config.get_user_agent();

        let mut extra = Dict::from([("user_agent".to_string(), Value::from(user_agent))]);
        if version.has_bolt_agent() {
            let agent = Dict::from([
                ("product".to_string(), Value::from(user_agent)),
                ("language".to_string(), Value::from("Rust")),
                (
                    "platform".to_string(),
                    Value::from(format!("{} {}", std::env::consts::OS, std::env::consts::ARCH)),
                ),
            ]);
            extra.insert("bolt_agent".to_string(), Value::Dict(agent));
        }
        if !version.has_logon() {
            extra.extend(config.get_auth().to_dict());
        }

        let metadata = self.exchange(ClientMessage::Hello { extra }).await?;
        self.server_agent = metadata
            .get("server")
            .and_then(|v| v.as_str())
            .map(str::to_owned);

        if version.has_logon() {
            self.exchange(ClientMessage::Logon {
                auth: config.get_auth().to_dict(),
            })
            .await?;
        }

        tracing::debug!(
            %version,
            server = self.server_agent.as_deref().unwrap_or("unknown"),
            scheme = %config.get_auth().scheme,
            "Bolt connection ready"
        );
        Ok(())
    }

    /// Runs a query to completion and collects every record.
    pub async fn query(&mut self, query: &str, parameters: BoltDict) -> BoltResult<QueryResult> {
        let keys = self.run(query, parameters).await?;
        let (records, summary) = self.pull_all().await?;
        Ok(QueryResult {
            keys,
            records,
            summary,
        })
    }

    /// Sends RUN and returns the result's column names.
    pub async fn run(&mut self, query: &str, parameters: BoltDict) -> BoltResult<Vec<String>> {
        let parameters = self.hydrator.dehydrate_dict(&parameters)?;
        let mut extra = Dict::new();
        if !self.in_transaction {
            self.insert_database(&mut extra);
        }

        let metadata = self
            .request(ClientMessage::Run {
                query: query.to_string(),
                parameters,
                extra,
            })
            .await?;

        Ok(match metadata.get("fields") {
            Some(BoltValue::List(fields)) => fields
                .iter()
                .filter_map(|f| f.as_str().map(str::to_owned))
                .collect(),
            _ => Vec::new(),
        })
    }

    /// Sends PULL for all remaining records and hydrates them.
    pub async fn pull_all(&mut self) -> BoltResult<(Vec<Vec<BoltValue>>, BoltDict)> {
        self.ensure_usable()?;
        self.send(ClientMessage::pull_all()).await?;

        let mut records = Vec::new();
        loop {
            match self.recv().await? {
                ServerMessage::Record { data } => {
                    records.push(self.hydrator.hydrate_list(data)?);
                }
                ServerMessage::Success { metadata } => {
                    let summary = self.hydrator.hydrate_dict(metadata)?;
                    tracing::debug!(records = records.len(), "PULL complete");
                    return Ok((records, summary));
                }
                ServerMessage::Failure { metadata } => return Err(self.recover(metadata).await),
                ServerMessage::Ignored => {
                    return Err(self.violation("PULL was ignored".to_string()));
                }
            }
        }
    }

    /// Sends DISCARD for all remaining records.
    pub async fn discard_all(&mut self) -> BoltResult<BoltDict> {
        self.request(ClientMessage::discard_all()).await
    }

    /// Opens an explicit transaction.
    pub async fn begin(&mut self) -> BoltResult<()> {
        let mut extra = Dict::new();
        self.insert_database(&mut extra);
        self.request(ClientMessage::Begin { extra }).await?;
        self.in_transaction = true;
        Ok(())
    }

    /// Commits the open transaction and returns the commit metadata, which
    /// carries the bookmark.
    pub async fn commit(&mut self) -> BoltResult<BoltDict> {
        let metadata = self.request(ClientMessage::Commit).await?;
        self.in_transaction = false;
        Ok(metadata)
    }

    pub async fn rollback(&mut self) -> BoltResult<()> {
        self.request(ClientMessage::Rollback).await?;
        self.in_transaction = false;
        Ok(())
    }

    /// Returns the server to a clean state, discarding any open transaction.
    pub async fn reset(&mut self) -> BoltResult<()> {
        self.ensure_usable()?;
        self.send(ClientMessage::Reset).await?;
        match self.recv().await? {
            ServerMessage::Success { .. } => {
                self.in_transaction = false;
                Ok(())
            }
            other => Err(self.violation(format!("expected SUCCESS after RESET, got {}", other.name()))),
        }
    }

    /// Sends GOODBYE and closes the stream. The server sends no response.
    pub async fn goodbye(mut self) -> BoltResult<()> {
        self.send(ClientMessage::Goodbye).await?;
        let mut writer = self.writer.into_inner();
        writer.shutdown().await?;
        Ok(())
    }

    fn insert_database(&self, extra: &mut Dict) {
        if let Some(db) = &self.database {
            extra.insert("db".to_string(), Value::from(db.as_str()));
        }
    }

    /// Sends one request and expects SUCCESS, resetting after FAILURE.
    async fn request(&mut self, msg: ClientMessage) -> BoltResult<BoltDict> {
        self.ensure_usable()?;
        let name = msg.name();
        self.send(msg).await?;
        match self.recv().await? {
            ServerMessage::Success { metadata } => self.hydrator.hydrate_dict(metadata),
            ServerMessage::Failure { metadata } => Err(self.recover(metadata).await),
            other => Err(self.violation(format!("expected SUCCESS after {name}, got {}", other.name()))),
        }
    }

    /// Like `request`, but without the RESET: used while authenticating,
    /// where the server closes the connection after FAILURE.
    async fn exchange(&mut self, msg: ClientMessage) -> BoltResult<BoltDict> {
        let name = msg.name();
        self.send(msg).await?;
        match self.recv().await? {
            ServerMessage::Success { metadata } => self.hydrator.hydrate_dict(metadata),
            ServerMessage::Failure { metadata } => {
                self.defunct = true;
                Err(BoltError::from_failure(&self.hydrator.hydrate_dict(metadata)?))
            }
            other => Err(self.violation(format!("expected SUCCESS after {name}, got {}", other.name()))),
        }
    }

    /// Turns FAILURE metadata into an error and acknowledges it with RESET.
    async fn recover(&mut self, metadata: Dict) -> BoltError {
        let err = match self.hydrator.hydrate_dict(metadata) {
            Ok(metadata) => BoltError::from_failure(&metadata),
            Err(e) => return self.fail(e),
        };
        tracing::debug!(error = %err, "request failed, resetting connection");
        if let Err(e) = self.reset().await {
            tracing::warn!(error = %e, "RESET after failure did not succeed");
        }
        err
    }

    async fn send(&mut self, msg: ClientMessage) -> BoltResult<()> {
        tracing::trace!(message = msg.name(), "C:");
        // Encoding fails before anything is written, so only I/O errors
        // leave the stream in an unknown state.
        match self.writer.send(&msg.to_message()).await {
            Err(e @ BoltError::Io(_)) => return Err(self.fail(e)),
            other => other?,
        }
        self.writer.flush().await.map_err(|e| self.fail(e))
    }

    /// Reads the next message, skipping empty keep-alive bodies.
    async fn recv(&mut self) -> BoltResult<ServerMessage> {
        loop {
            let body = match self.reader.read_message().await {
                Ok(body) => body,
                Err(e) => return Err(self.fail(e)),
            };
            if body.is_empty() {
                tracing::trace!("S: NOOP");
                continue;
            }
            let msg = decode_server_message(&body).map_err(|e| self.fail(e))?;
            tracing::trace!(message = msg.name(), "S:");
            return Ok(msg);
        }
    }

    fn ensure_usable(&self) -> BoltResult<()> {
        if self.defunct {
            Err(BoltError::Protocol("connection is defunct".into()))
        } else {
            Ok(())
        }
    }

    fn violation(&mut self, reason: String) -> BoltError {
        tracing::warn!(%reason, "protocol violation from server");
        self.fail(BoltError::Protocol(reason))
    }

    fn fail(&mut self, err: BoltError) -> BoltError {
        if err.is_fatal() {
            self.defunct = true;
        }
        err
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, DuplexStream};

    use super::*;
    use crate::packstream::Structure;
    use crate::types::tag;
    use crate::version::{NO_VERSION, negotiate};

    /// Scripted server side of a duplex stream.
    struct FakeServer {
        reader: ChunkReader<ReadHalf<DuplexStream>>,
        writer: ChunkWriter<WriteHalf<DuplexStream>>,
    }

    impl FakeServer {
        async fn accept(mut stream: DuplexStream, supported: &[Version]) -> Self {
            let mut request = [0u8; 20];
            stream.read_exact(&mut request).await.unwrap();
            let proposals: [u8; 16] = request[4..].try_into().unwrap();
            let version = negotiate(&proposals, supported).unwrap();
            stream.write_all(&version.to_bytes()).await.unwrap();

            let (rh, wh) = tokio::io::split(stream);
            Self {
                reader: ChunkReader::new(rh),
                writer: ChunkWriter::new(wh),
            }
        }

        async fn expect(&mut self) -> ClientMessage {
            ClientMessage::try_from(self.reader.recv().await.unwrap()).unwrap()
        }

        async fn reply(&mut self, msg: ServerMessage) {
            self.writer.send(&msg.to_message()).await.unwrap();
            self.writer.flush().await.unwrap();
        }

        async fn noop(&mut self) {
            self.writer.write_message(&[]).await.unwrap();
        }

        async fn success(&mut self, entries: &[(&str, Value)]) {
            let metadata = entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect();
            self.reply(ServerMessage::Success { metadata }).await;
        }

        /// Answers HELLO and, on 5.1+, LOGON.
        async fn authenticate(&mut self, logon: bool) {
            assert!(matches!(self.expect().await, ClientMessage::Hello { .. }));
            self.success(&[("server", Value::from("Neo4j/5.20.0"))]).await;
            if logon {
                assert!(matches!(self.expect().await, ClientMessage::Logon { .. }));
                self.success(&[]).await;
            }
        }
    }

    fn node(id: i64) -> Value {
        Value::Structure(Structure::new(
            tag::NODE,
            vec![
                Value::Integer(id),
                Value::List(vec![Value::from("Person")]),
                Value::Dict(Dict::new()),
                Value::String(format!("4:db:{id}")),
            ],
        ))
    }

    #[tokio::test]
    async fn bolt5_authenticates_with_logon() {
        let (client, server) = tokio::io::duplex(4096);
        let server = tokio::spawn(async move {
            let mut server = FakeServer::accept(server, &[Version::V5_4]).await;
            let hello = server.expect().await;
            server.success(&[("server", Value::from("Neo4j/5.20.0"))]).await;
            let logon = server.expect().await;
            server.success(&[]).await;
            (hello, logon)
        });

        let config = ConnectionConfig::builder()
            .user_agent("test/1.0")
            .basic_auth("neo4j", "secret");
        let conn = Connection::open(client, &config).await.unwrap();
        assert_eq!(conn.version(), Version::V5_4);
        assert_eq!(conn.server_agent(), Some("Neo4j/5.20.0"));

        let (hello, logon) = server.await.unwrap();
        match hello {
            ClientMessage::Hello { extra } => {
                assert_eq!(extra.get("user_agent"), Some(&Value::from("test/1.0")));
                assert!(extra.contains_key("bolt_agent"));
                assert!(!extra.contains_key("credentials"));
            }
            other => panic!("expected HELLO, got {other:?}"),
        }
        match logon {
            ClientMessage::Logon { auth } => {
                assert_eq!(auth.get("scheme"), Some(&Value::from("basic")));
                assert_eq!(auth.get("credentials"), Some(&Value::from("secret")));
            }
            other => panic!("expected LOGON, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn bolt4_sends_auth_in_hello() {
        let (client, server) = tokio::io::duplex(4096);
        let server = tokio::spawn(async move {
            let mut server = FakeServer::accept(server, &[Version::V4_4]).await;
            let hello = server.expect().await;
            server.success(&[]).await;
            hello
        });

        let config = ConnectionConfig::builder().basic_auth("neo4j", "secret");
        let conn = Connection::open(client, &config).await.unwrap();
        assert_eq!(conn.version(), Version::V4_4);

        match server.await.unwrap() {
            ClientMessage::Hello { extra } => {
                assert_eq!(extra.get("principal"), Some(&Value::from("neo4j")));
                assert!(!extra.contains_key("bolt_agent"));
            }
            other => panic!("expected HELLO, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn rejected_credentials_fail_open() {
        let (client, server) = tokio::io::duplex(4096);
        let server = tokio::spawn(async move {
            let mut server = FakeServer::accept(server, &[Version::V5_4]).await;
            server.expect().await;
            server.success(&[]).await;
            server.expect().await;
            let metadata = Dict::from([
                (
                    "code".to_string(),
                    Value::from("Neo.ClientError.Security.Unauthorized"),
                ),
                ("message".to_string(), Value::from("bad credentials")),
            ]);
            server.reply(ServerMessage::Failure { metadata }).await;
        });

        let err = Connection::open(client, &ConnectionConfig::default())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, BoltError::Authentication(ref m) if m == "bad credentials"));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn query_hydrates_records_and_skips_noops() {
        let (client, server) = tokio::io::duplex(4096);
        let server = tokio::spawn(async move {
            let mut server = FakeServer::accept(server, &[Version::V5_4]).await;
            server.authenticate(true).await;

            let run = server.expect().await;
            server
                .success(&[("fields", Value::List(vec![Value::from("n")]))])
                .await;
            assert!(matches!(server.expect().await, ClientMessage::Pull { .. }));
            server.reply(ServerMessage::Record { data: vec![node(1)] }).await;
            server.noop().await;
            server.reply(ServerMessage::Record { data: vec![node(2)] }).await;
            server.success(&[("type", Value::from("r"))]).await;
            run
        });

        let config = ConnectionConfig::builder().database("movies");
        let mut conn = Connection::open(client, &config).await.unwrap();
        let params = BoltDict::from([("limit".to_string(), BoltValue::Integer(2))]);
        let result = conn.query("MATCH (n) RETURN n LIMIT $limit", params).await.unwrap();

        assert_eq!(result.keys, vec!["n".to_string()]);
        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[1][0].as_node().map(|n| n.id), Some(2));
        assert_eq!(result.summary.get("type"), Some(&BoltValue::from("r")));

        match server.await.unwrap() {
            ClientMessage::Run {
                query,
                parameters,
                extra,
            } => {
                assert_eq!(query, "MATCH (n) RETURN n LIMIT $limit");
                assert_eq!(parameters.get("limit"), Some(&Value::Integer(2)));
                assert_eq!(extra.get("db"), Some(&Value::from("movies")));
            }
            other => panic!("expected RUN, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn failure_sends_reset_and_keeps_connection() {
        let (client, server) = tokio::io::duplex(4096);
        let server = tokio::spawn(async move {
            let mut server = FakeServer::accept(server, &[Version::V5_4]).await;
            server.authenticate(true).await;

            server.expect().await;
            let metadata = Dict::from([
                (
                    "code".to_string(),
                    Value::from("Neo.ClientError.Statement.SyntaxError"),
                ),
                ("message".to_string(), Value::from("Invalid input 'RETRUN'")),
            ]);
            server.reply(ServerMessage::Failure { metadata }).await;
            assert_eq!(server.expect().await, ClientMessage::Reset);
            server.success(&[]).await;

            assert!(matches!(server.expect().await, ClientMessage::Run { .. }));
            server.success(&[("fields", Value::List(vec![]))]).await;
        });

        let mut conn = Connection::open(client, &ConnectionConfig::default())
            .await
            .unwrap();
        let err = conn.run("RETRUN 1", BoltDict::new()).await.unwrap_err();
        assert!(matches!(err, BoltError::Query { ref code, .. } if code.ends_with("SyntaxError")));
        assert!(!conn.is_defunct());

        assert_eq!(conn.run("RETURN 1", BoltDict::new()).await.unwrap(), Vec::<String>::new());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn transaction_carries_database_in_begin() {
        let (client, server) = tokio::io::duplex(4096);
        let server = tokio::spawn(async move {
            let mut server = FakeServer::accept(server, &[Version::V5_4]).await;
            server.authenticate(true).await;

            let begin = server.expect().await;
            server.success(&[]).await;
            let run = server.expect().await;
            server.success(&[]).await;
            assert_eq!(server.expect().await, ClientMessage::Commit);
            server.success(&[("bookmark", Value::from("FB:kcwQ"))]).await;
            (begin, run)
        });

        let config = ConnectionConfig::builder().database("movies");
        let mut conn = Connection::open(client, &config).await.unwrap();
        conn.begin().await.unwrap();
        conn.run("CREATE (n)", BoltDict::new()).await.unwrap();
        let summary = conn.commit().await.unwrap();
        assert_eq!(summary.get("bookmark"), Some(&BoltValue::from("FB:kcwQ")));

        match server.await.unwrap() {
            (ClientMessage::Begin { extra: begin }, ClientMessage::Run { extra: run, .. }) => {
                assert_eq!(begin.get("db"), Some(&Value::from("movies")));
                assert!(!run.contains_key("db"));
            }
            other => panic!("unexpected messages: {other:?}"),
        }
    }

    #[tokio::test]
    async fn dehydration_error_sends_nothing() {
        let (client, server) = tokio::io::duplex(4096);
        let server = tokio::spawn(async move {
            let mut server = FakeServer::accept(server, &[Version::V5_4]).await;
            server.authenticate(true).await;
            // The next message after the rejected RUN.
            server.expect().await
        });

        let mut conn = Connection::open(client, &ConnectionConfig::default())
            .await
            .unwrap();
        let raw = Structure::new(0x01, (0..16).map(Value::Integer).collect());
        let params = BoltDict::from([("x".to_string(), BoltValue::Structure(raw))]);
        let err = conn.run("RETURN $x", params).await.unwrap_err();
        assert!(matches!(err, BoltError::TooManyFields(16)));
        assert!(!conn.is_defunct());

        conn.goodbye().await.unwrap();
        assert_eq!(server.await.unwrap(), ClientMessage::Goodbye);
    }

    #[tokio::test]
    async fn refused_version_fails_open() {
        let (client, mut server) = tokio::io::duplex(64);
        let server = tokio::spawn(async move {
            let mut request = [0u8; 20];
            server.read_exact(&mut request).await.unwrap();
            server.write_all(&NO_VERSION).await.unwrap();
        });

        let err = Connection::open(client, &ConnectionConfig::default())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, BoltError::Protocol(_)));
        server.await.unwrap();
    }
}
