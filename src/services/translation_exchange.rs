// src/services/translation_exchange.rs
//
// Formatos de troca das traduções (CSV/JSON) e o plano de importação.
// Tudo aqui é puro: sem banco, sem E/S.

use std::collections::{BTreeMap, HashMap};

use serde_json::{Map, Value};

use crate::{
    common::error::AppError,
    db::KeyWrite,
    models::translation::{
        ImportConflict, ImportSummary, Locale, TranslationEntry, TranslationPath, TranslationRecord,
    },
};

pub const CSV_COLUMNS: [&str; 6] = ["page", "section", "key", "tk", "ru", "en"];

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

pub fn to_csv(records: &[TranslationRecord]) -> String {
    let mut out = CSV_COLUMNS.join(",");
    for r in records {
        let row = [&r.page, &r.section, &r.key, &r.tk, &r.ru, &r.en];
        out.push('\n');
        out.push_str(&row.iter().map(|f| quote(f)).collect::<Vec<_>>().join(","));
    }
    out
}

// Quebra o texto em linhas/campos respeitando aspas ("" escapa aspas,
// vírgulas e quebras de linha dentro de aspas fazem parte do campo).
fn split_rows(data: &str) -> Result<Vec<Vec<String>>, AppError> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = data.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' => in_quotes = true,
            ',' => row.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(AppError::BadRequest("CSV inválido: aspas não fechadas.".into()));
    }
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }
    Ok(rows)
}

/// Lê o CSV pelo nome das colunas; colunas extras (id, updatedAt...) são ignoradas.
pub fn parse_csv(data: &str) -> Result<Vec<TranslationRecord>, AppError> {
    let mut rows = split_rows(data)?.into_iter();
    let header: Vec<String> = match rows.next() {
        Some(h) => h.into_iter().map(|c| c.trim().to_string()).collect(),
        None => return Ok(Vec::new()),
    };

    let column = |name: &str| header.iter().position(|h| h == name);
    let (page, section, key) = match (column("page"), column("section"), column("key")) {
        (Some(p), Some(s), Some(k)) => (p, s, k),
        _ => {
            return Err(AppError::BadRequest(
                "CSV inválido: as colunas page, section e key são obrigatórias.".into(),
            ))
        }
    };
    let (tk, ru, en) = (column("tk"), column("ru"), column("en"));

    let records = rows
        .filter(|row| row.iter().any(|f| !f.trim().is_empty()))
        .map(|row| {
            let get = |idx: Option<usize>| {
                idx.and_then(|i| row.get(i)).map(|v| v.trim().to_string()).unwrap_or_default()
            };
            TranslationRecord {
                page: get(Some(page)),
                section: get(Some(section)),
                key: get(Some(key)),
                tk: get(tk),
                ru: get(ru),
                en: get(en),
            }
        })
        .collect();
    Ok(records)
}

pub fn parse_json(data: &str) -> Result<Vec<TranslationRecord>, AppError> {
    serde_json::from_str::<Vec<TranslationRecord>>(data)
        .map_err(|e| AppError::BadRequest(format!("JSON inválido: {}", e)))
}

/// page -> section -> key -> valor, para um idioma (arquivos `<locale>.json`).
pub fn nest_by_locale(entries: &[TranslationEntry], locale: Locale) -> Value {
    let mut root = Map::new();
    for e in entries {
        let value = e.values.get(&locale).cloned().unwrap_or_default();
        let page = root
            .entry(e.page.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(sections) = page {
            let section = sections
                .entry(e.section.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(keys) = section {
                keys.insert(e.key.clone(), Value::String(value));
            }
        }
    }
    Value::Object(root)
}

fn non_empty_values(record: &TranslationRecord) -> BTreeMap<Locale, String> {
    Locale::ALL
        .iter()
        .filter(|l| !record.value(**l).is_empty())
        .map(|l| (*l, record.value(*l).to_string()))
        .collect()
}

fn record_path(record: &TranslationRecord) -> Option<TranslationPath> {
    let (page, section, key) = (record.page.trim(), record.section.trim(), record.key.trim());
    if page.is_empty() || section.is_empty() || key.is_empty() {
        return None;
    }
    Some(TranslationPath::new(page, section, key))
}

#[derive(Debug, Default)]
pub struct ImportPlan {
    pub writes: Vec<KeyWrite>,
    pub summary: ImportSummary,
}

/// Decide o que gravar a partir do estado atual.
///
/// - registro sem page/section/key conta como erro;
/// - célula vazia nunca sobrescreve um valor existente;
/// - valores não vazios que divergem são aplicados e reportados como conflito.
pub fn plan_import(
    existing: &HashMap<TranslationPath, BTreeMap<Locale, String>>,
    records: &[TranslationRecord],
) -> ImportPlan {
    let mut plan = ImportPlan::default();
    // Estado "depois" das linhas já planejadas (duplicatas no mesmo arquivo)
    let mut seen: HashMap<TranslationPath, BTreeMap<Locale, String>> = HashMap::new();

    for record in records {
        let Some(path) = record_path(record) else {
            plan.summary.errors += 1;
            continue;
        };
        let incoming = non_empty_values(record);

        let current = seen.get(&path).or_else(|| existing.get(&path)).cloned();
        match current {
            Some(current) => {
                let diverges = incoming
                    .iter()
                    .any(|(l, v)| current.get(l).is_some_and(|old| !old.is_empty() && old != v));
                if diverges {
                    plan.summary.conflicts.push(ImportConflict {
                        key: path.to_string(),
                        existing: current.clone(),
                        incoming: incoming.clone(),
                    });
                }
                let mut merged = current;
                merged.extend(incoming.clone());
                seen.insert(path.clone(), merged);
                plan.summary.updated += 1;
            }
            None => {
                seen.insert(path.clone(), incoming.clone());
                plan.summary.created += 1;
            }
        }

        plan.writes.push(KeyWrite { path, values: incoming });
    }

    plan
}
