use serde::Serialize;

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// One line per row, cells separated by tabs.
pub fn print_rows<R, C>(rows: R)
where
    R: IntoIterator,
    R::Item: IntoIterator<Item = C>,
    C: AsRef<str>,
{
    for row in rows {
        println!("{}", format_row(row));
    }
}

pub fn format_row<C: AsRef<str>>(row: impl IntoIterator<Item = C>) -> String {
    row.into_iter()
        .map(|cell| cell.as_ref().replace(['\t', '\n'], " "))
        .collect::<Vec<_>>()
        .join("\t")
}

/// Splits tab-separated text into rows, ignoring blank lines.
pub fn parse_rows(text: &str) -> Vec<Vec<String>> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.split('\t').map(str::to_string).collect())
        .collect()
}

/// `name=value` argument parser.
pub fn key_value(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected name=value, got '{}'", raw))
}
