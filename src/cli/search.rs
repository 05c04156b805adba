use super::harness::Harness;
use crate::domain::{Query, SearchContext};
use crate::infra::config::ELASTICSEARCH_SERVICE;
use anyhow::{Context, Result, anyhow, bail};
use clap::Args;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Índice (ou padrão de índices) a consultar
    #[arg(long, short)]
    pub index: String,
    /// Serviço configurado que responde à consulta
    #[arg(long, default_value = ELASTICSEARCH_SERVICE)]
    pub service: String,
    /// Corpo da consulta em JSON (padrão: match_all)
    #[arg(long, short, conflicts_with = "query_file")]
    pub query: Option<String>,
    /// Arquivo com o corpo da consulta em JSON
    #[arg(long)]
    pub query_file: Option<PathBuf>,
    /// Prazo máximo da requisição (ex: 500ms, 30s, 2m)
    #[arg(long)]
    pub timeout: Option<String>,
}

pub fn run(args: &SearchArgs, harness: &Harness) -> Result<()> {
    let query = load_query(args)?;
    let ctx = match &args.timeout {
        Some(timeout) => SearchContext::background().with_timeout(parse_duration(timeout)?),
        None => SearchContext::background(),
    };

    info!(" Consultando {} em '{}'...", args.service, args.index);
    let result = harness
        .search_service(&args.service)
        .search_with_context(&ctx, &args.index, &query)?;

    println!("{}", serde_json::to_string_pretty(&result.result)?);

    Ok(())
}

fn load_query(args: &SearchArgs) -> Result<Query> {
    let raw = match (&args.query, &args.query_file) {
        (Some(query), _) => query.clone(),
        (None, Some(path)) => {
            let path = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned());
            fs::read_to_string(&path).with_context(|| format!("lendo consulta em {:?}", path))?
        }
        (None, None) => return Ok(Query::match_all()),
    };

    parse_query(&raw)
}

fn parse_query(raw: &str) -> Result<Query> {
    let value: serde_json::Value =
        serde_json::from_str(raw).context("consulta não é um JSON válido")?;
    Query::from_value(value).ok_or_else(|| anyhow!("consulta deve ser um objeto JSON"))
}

pub(crate) fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();
    if let Some(stripped) = s.strip_suffix("ms") {
        let millis: u64 = stripped.parse()?;
        Ok(Duration::from_millis(millis))
    } else if let Some(stripped) = s.strip_suffix('s') {
        let secs: u64 = stripped.parse()?;
        Ok(Duration::from_secs(secs))
    } else if let Some(stripped) = s.strip_suffix('m') {
        let mins: u64 = stripped.parse()?;
        Ok(Duration::from_secs(mins * 60))
    } else {
        bail!("Formato de duração inválido: {}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(query: Option<&str>, query_file: Option<PathBuf>) -> SearchArgs {
        SearchArgs {
            index: "metrics-test".into(),
            service: ELASTICSEARCH_SERVICE.into(),
            query: query.map(str::to_string),
            query_file,
            timeout: None,
        }
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration(" 2m ").unwrap(), Duration::from_secs(120));
        assert!(parse_duration("2h").is_err());
        assert!(parse_duration("abcs").is_err());
    }

    #[test]
    fn test_default_query_is_match_all() {
        assert_eq!(load_query(&args(None, None)).unwrap(), Query::match_all());
    }

    #[test]
    fn test_inline_query() {
        let query = load_query(&args(Some(r#"{"size": 0}"#), None)).unwrap();
        assert_eq!(serde_json::to_value(query).unwrap(), json!({"size": 0}));
    }

    #[test]
    fn test_query_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("query.json");
        fs::write(&path, r#"{"query": {"term": {"metricset.name": "cpu"}}}"#).unwrap();

        let query = load_query(&args(None, Some(path))).unwrap();
        assert_eq!(
            serde_json::to_value(query).unwrap(),
            json!({"query": {"term": {"metricset.name": "cpu"}}})
        );
    }

    #[test]
    fn test_rejects_non_object_query() {
        assert!(parse_query("[1, 2]").is_err());
        assert!(parse_query("{not json").is_err());
    }
}
