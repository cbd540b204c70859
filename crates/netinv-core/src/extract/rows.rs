// Listing tables: active MACs (`?maclist=`) and NAM/port spans (`?span=`).
//
// Both pages render data rows as `<tr valign="center">` with one `<td>` per
// field; only the column count and trailing fields differ.

use std::sync::LazyLock;

use scraper::{Html, Selector};

use super::{Extraction, ParseIssue};
use crate::buildings::BuildingNameMap;
use crate::model::{MacRecord, NamRecord};

static DATA_ROW: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"tr[valign="center"]"#).expect("static selector"));
static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").expect("static selector"));

/// A fixed-width row layout. The second cell always holds a facility code.
pub trait RowSchema: Sized {
    const NAME: &'static str;
    const CELLS: usize;

    /// Build a record from at least [`Self::CELLS`] trimmed cells.
    fn from_cells(cells: Vec<String>, buildings: &BuildingNameMap) -> Self;
}

impl RowSchema for MacRecord {
    const NAME: &'static str = "active-mac";
    const CELLS: usize = 7;

    fn from_cells(cells: Vec<String>, buildings: &BuildingNameMap) -> Self {
        let mut cells = cells.into_iter();
        let mut next = move || cells.next().unwrap_or_default();
        let nam = next();
        let building = buildings.resolve(&next()).to_owned();
        Self {
            nam,
            building,
            room: next(),
            switch: next(),
            port: next(),
            mac: next(),
            last_seen: next(),
        }
    }
}

impl RowSchema for NamRecord {
    const NAME: &'static str = "nam";
    const CELLS: usize = 8;

    fn from_cells(cells: Vec<String>, buildings: &BuildingNameMap) -> Self {
        let mut cells = cells.into_iter();
        let mut next = move || cells.next().unwrap_or_default();
        let nam = next();
        let building = buildings.resolve(&next()).to_owned();
        Self {
            nam,
            building,
            room: next(),
            switch: next(),
            port: next(),
            port_state: next(),
            configured_speed: next(),
            actual_speed: next(),
        }
    }
}

/// Every data row of `page` as `T`, in source order. Rows with too few
/// cells are skipped and reported.
pub fn extract_rows<T: RowSchema>(page: &str, buildings: &BuildingNameMap) -> Extraction<T> {
    let rows: Vec<Vec<String>> = {
        let document = Html::parse_document(page);
        document
            .select(&DATA_ROW)
            .map(|row| {
                row.select(&CELL)
                    .map(|cell| cell.text().collect::<String>().trim().to_owned())
                    .collect()
            })
            .collect()
    };

    let mut out = Extraction::default();
    for (index, cells) in rows.into_iter().enumerate() {
        if cells.len() < T::CELLS {
            out.report(ParseIssue::ShortRow {
                schema: T::NAME,
                row: index,
                cells: cells.len(),
                expected: T::CELLS,
            });
            continue;
        }
        out.push(T::from_cells(cells, buildings));
    }
    out
}

pub fn extract_active_macs(page: &str, buildings: &BuildingNameMap) -> Extraction<MacRecord> {
    extract_rows(page, buildings)
}

pub fn extract_nams(page: &str, buildings: &BuildingNameMap) -> Extraction<NamRecord> {
    extract_rows(page, buildings)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn buildings() -> BuildingNameMap {
        BuildingNameMap::load(
            "FacilityCode,BuildingName\nK05,Kemper Hall\n".as_bytes(),
            "FacilityCode,BuildingName\nT99,Test Annex\n".as_bytes(),
        )
        .unwrap()
    }

    fn row(cells: &[&str]) -> String {
        let tds: String = cells.iter().map(|c| format!("<td> {c} </td>")).collect();
        format!(r#"<tr valign="center">{tds}</tr>"#)
    }

    fn table(rows: &[String]) -> String {
        format!(
            r#"<html><body><table><tr valign="top"><th>NAM</th></tr>{}</table></body></html>"#,
            rows.concat()
        )
    }

    #[test]
    fn active_mac_rows_resolve_buildings() {
        let html = table(&[row(&[
            "K05-1101-A",
            "K05",
            "1101",
            "kemper-sw1",
            "Gi1/0/12",
            "00:11:22:33:44:55",
            "2024-03-01 10:22",
        ])]);
        let out = extract_active_macs(&html, &buildings());

        assert!(out.is_complete());
        assert_eq!(
            out.records,
            vec![MacRecord {
                nam: "K05-1101-A".into(),
                building: "Kemper Hall".into(),
                room: "1101".into(),
                switch: "kemper-sw1".into(),
                port: "Gi1/0/12".into(),
                mac: "00:11:22:33:44:55".into(),
                last_seen: "2024-03-01 10:22".into(),
            }]
        );
    }

    #[test]
    fn unknown_code_stays_raw() {
        let html = table(&[row(&["ZZ9-1-A", "ZZ9", "1", "sw", "p1", "aa:bb", "today"])]);
        let out = extract_active_macs(&html, &buildings());
        assert_eq!(out.records[0].building, "ZZ9");
    }

    #[test]
    fn short_rows_are_skipped_in_order() {
        let html = table(&[
            row(&["A", "T99", "1", "sw", "p1", "up", "1G", "1G"]),
            row(&["B", "T99", "2"]),
            row(&["C", "K05", "3", "sw", "p3", "down", "auto", ""]),
        ]);
        let out = extract_nams(&html, &buildings());

        let nams: Vec<&str> = out.records.iter().map(|r| r.nam.as_str()).collect();
        assert_eq!(nams, vec!["A", "C"]);
        assert_eq!(out.records[0].building, "Test Annex");
        assert_eq!(out.records[1].actual_speed, "");
        assert_eq!(
            out.issues,
            vec![ParseIssue::ShortRow {
                schema: "nam",
                row: 1,
                cells: 3,
                expected: 8,
            }]
        );
    }

    #[test]
    fn extra_cells_are_ignored() {
        let html = table(&[row(&["A", "K05", "1", "sw", "p1", "mac", "seen", "extra"])]);
        let out = extract_active_macs(&html, &buildings());
        assert_eq!(out.records[0].last_seen, "seen");
    }
}
