use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Serviço '{0}' não está configurado")]
    ServiceNotConfigured(String),

    #[error("Falha ao inspecionar container '{container}': {source:#}")]
    Inspection {
        container: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Porta {port} do serviço '{service}' não está publicada (container pronto?)")]
    PortNotBound { service: String, port: u16 },

    /// Malformed client configuration. A programming error, never retried.
    #[error("Endereço inválido para o cliente: {0}")]
    InvalidAddress(String),

    #[error("Erro ao codificar consulta do Elasticsearch: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Erro ao obter resposta do Elasticsearch: {0}")]
    Transport(#[from] TransportError),

    #[error("Erro ao interpretar corpo da resposta do Elasticsearch: {0}")]
    Decode(#[from] DecodeError),

    #[error(
        "Erro na resposta do Elasticsearch. Status: {status}, Tipo: {error_type}, Motivo: {reason}"
    )]
    Structured {
        status: String,
        error_type: String,
        reason: String,
    },
}

impl SearchError {
    /// Well-formed rejection by the search service (bad query, missing index).
    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Structured { .. })
    }

    /// Environment or wire failure, as opposed to a rejected request.
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            Self::Inspection { .. } | Self::PortNotBound { .. } | Self::Transport(_) | Self::Decode(_)
        )
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Transport(TransportError::Cancelled))
    }
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("requisição cancelada")]
    Cancelled,

    #[error("prazo da requisição esgotado")]
    DeadlineExceeded,

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("falha de I/O ao preparar a requisição: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("esperado objeto JSON, recebido {0}")]
    NotAnObject(&'static str),
}
