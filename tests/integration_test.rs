/* Copyright © 2024-2025 Adam Train <adam@trainrelay.net>
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 */
use calamine::{open_workbook_auto, Data, Reader};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use rust_xlsxwriter::Workbook;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

type TableRow<'a> = (Option<&'a str>, Option<&'a str>, Option<f64>);

/// Writes a reference table. None leaves the cell blank.
fn write_table(path: &Path, rows: &[TableRow]) {
	let mut workbook = Workbook::new();
	let sheet = workbook.add_worksheet();
	sheet.write_string(0, 0, "Municipio").unwrap();
	sheet.write_string(0, 1, "Estabelecimento").unwrap();
	sheet.write_string(0, 2, "Valor Total").unwrap();

	for (i, (m, e, t)) in rows.iter().enumerate() {
		let line = i as u32 + 1;
		if let Some(m) = m {
			sheet.write_string(line, 0, *m).unwrap();
		}
		if let Some(e) = e {
			sheet.write_string(line, 1, *e).unwrap();
		}
		if let Some(t) = t {
			sheet.write_number(line, 2, *t).unwrap();
		}
	}

	workbook.save(path).unwrap();
}

fn read_table(path: &Path) -> Vec<Vec<Data>> {
	let mut workbook = open_workbook_auto(path).unwrap();
	let range = workbook.worksheet_range_at(0).unwrap().unwrap();
	range.rows().map(|r| r.to_vec()).collect()
}

/// Writes a PDF with one line of embedded text per page.
fn write_pdf(path: &Path, pages: &[&str]) {
	let mut doc = Document::with_version("1.5");
	let pages_id = doc.new_object_id();
	let font_id = doc.add_object(dictionary! {
		"Type" => "Font",
		"Subtype" => "Type1",
		"BaseFont" => "Courier",
	});
	let resources_id = doc.add_object(dictionary! {
		"Font" => dictionary! { "F1" => font_id },
	});

	let mut kids: Vec<Object> = vec![];
	for text in pages {
		let content = Content {
			operations: vec![
				Operation::new("BT", vec![]),
				Operation::new("Tf", vec!["F1".into(), 12.into()]),
				Operation::new("Td", vec![50.into(), 700.into()]),
				Operation::new("Tj", vec![Object::string_literal(*text)]),
				Operation::new("ET", vec![]),
			],
		};
		let content_id =
			doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
		let page_id = doc.add_object(dictionary! {
			"Type" => "Page",
			"Parent" => pages_id,
			"Contents" => content_id,
		});
		kids.push(page_id.into());
	}

	let count = kids.len() as i64;
	doc.objects.insert(
		pages_id,
		Object::Dictionary(dictionary! {
			"Type" => "Pages",
			"Kids" => kids,
			"Count" => count,
			"Resources" => resources_id,
			"MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
		}),
	);
	let catalog_id = doc.add_object(dictionary! {
		"Type" => "Catalog",
		"Pages" => pages_id,
	});
	doc.trailer.set("Root", catalog_id);
	doc.save(path).unwrap();
}

const REPORT: [&str; 5] = [
	"Municipio: Campinas",
	"Estabelecimento: Loja 9",
	"Municipio: Valinhos",
	"Estabelecimento: Loja 10",
	"Total R$ 1.234,56",
];

fn romaneio(args: Vec<&str>) -> Output {
	Command::new("cargo")
		.args([vec!["run", "--"], args].concat())
		.output()
		.expect("Failed to execute process")
}

fn assert_success(cmd: &str, output: &Output) {
	assert!(
		output.status.success(),
		"{} failed: {}",
		cmd,
		String::from_utf8_lossy(&output.stderr)
	);
}

fn path_arg(path: &Path) -> &str {
	path.to_str().unwrap()
}

fn sample(path: &Path) {
	write_table(
		path,
		&[
			(Some("campinas"), Some("Loja 1"), Some(150.5)),
			(None, None, None),
			(Some("Sumaré "), Some("Loja 22"), None),
			(Some("Valinhos"), Some("A"), Some(0.05)),
		],
	);
}

#[test]
fn test_integration_show() {
	let dir = tempfile::tempdir().unwrap();
	let table = dir.path().join("gabarito.xlsx");
	sample(&table);

	let output = romaneio(vec!["show", "-t", path_arg(&table)]);
	assert_success("show", &output);

	let stdout = String::from_utf8_lossy(&output.stdout);
	let lines: Vec<&str> = stdout.trim().lines().collect();
	assert_eq!(lines[0], "Municipio | Estabelecimento | Valor Total");
	assert_eq!(lines[2], "CAMPINAS    LOJA 1                 150,50");
	assert_eq!(lines[3], "");
	assert_eq!(lines[4], "SUMARÉ      LOJA 22");
	assert_eq!(lines[5], "VALINHOS    A                        0,05");
	assert_eq!(lines[7], "                                   150,55");
}

#[test]
fn test_integration_clean() {
	let dir = tempfile::tempdir().unwrap();
	let table = dir.path().join("gabarito.xlsx");
	let updated = dir.path().join("atualizado.xlsx");
	sample(&table);

	let output =
		romaneio(vec!["clean", "-t", path_arg(&table), "-o", path_arg(&updated)]);
	assert_success("clean", &output);

	let rows = read_table(&updated);
	assert_eq!(rows.len(), 4);
	assert_eq!(rows[1][0], Data::String("CAMPINAS".to_string()));
	assert_eq!(rows[1][2], Data::Float(150.5));
	assert_eq!(rows[2][0], Data::String("SUMARÉ".to_string()));
	assert_eq!(rows[2][2], Data::Empty);
	assert_eq!(rows[3][1], Data::String("A".to_string()));
}

#[test]
fn test_integration_gerenciais() {
	let dir = tempfile::tempdir().unwrap();
	let table = dir.path().join("gabarito.xlsx");
	let report = dir.path().join("gerenciais.pdf");
	write_table(&table, &[(Some("Sumare"), Some("Loja 2"), Some(10.0))]);
	write_pdf(&report, &REPORT);

	let output = romaneio(vec![
		"gerenciais",
		"-t",
		path_arg(&table),
		"-g",
		path_arg(&report),
	]);
	assert_success("gerenciais", &output);

	// reference rows normalized, report rows appended verbatim, each with
	// the report's single amount
	let rows = read_table(&table);
	assert_eq!(rows.len(), 4);
	assert_eq!(rows[1][0], Data::String("SUMARE".to_string()));
	assert_eq!(rows[1][2], Data::Float(10.0));
	assert_eq!(rows[2][0], Data::String("Campinas".to_string()));
	assert_eq!(rows[2][1], Data::String("Loja 9".to_string()));
	assert_eq!(rows[2][2], Data::Float(1234.56));
	assert_eq!(rows[3][0], Data::String("Valinhos".to_string()));
	assert_eq!(rows[3][1], Data::String("Loja 10".to_string()));
	assert_eq!(rows[3][2], Data::Float(1234.56));
}

#[test]
fn test_integration_scan_needs_no_table() {
	let dir = tempfile::tempdir().unwrap();
	let report = dir.path().join("gerenciais.pdf");
	write_pdf(&report, &REPORT);

	let output = romaneio(vec!["scan", "-g", path_arg(&report)]);
	assert_success("scan", &output);

	let stdout = String::from_utf8_lossy(&output.stdout);
	assert!(stdout.contains("Campinas"));
	assert!(stdout.contains("Loja 10"));
	assert!(stdout.contains("1234,56"));
}

#[test]
fn test_integration_run_checks_report_first() {
	let dir = tempfile::tempdir().unwrap();
	let table = dir.path().join("gabarito.xlsx");
	let updated = dir.path().join("atualizado.xlsx");
	let scans = dir.path().join("romaneios.pdf");
	let config = dir.path().join("config.toml");
	sample(&table);
	write_pdf(&scans, &["pagina 1"]);
	fs::write(&config, "[ocr]\napi_key = \"unused\"\n").unwrap();

	let output = romaneio(vec![
		"run",
		"-t",
		path_arg(&table),
		"-o",
		path_arg(&updated),
		"-r",
		path_arg(&scans),
		"-g",
		path_arg(&dir.path().join("nao_existe.pdf")),
		"--config",
		path_arg(&config),
		"--review-dir",
		path_arg(&dir.path().join("revisar")),
	]);

	assert!(!output.status.success(), "run unexpectedly succeeded");
	let stderr = String::from_utf8_lossy(&output.stderr);
	assert!(!stderr.contains("processing romaneios"));
	assert!(!stderr.contains("romaneios done"));
	assert!(!updated.exists());
}

#[test]
fn test_integration_should_fail() {
	let dir = tempfile::tempdir().unwrap();

	// no rows at all
	let empty = dir.path().join("vazio.xlsx");
	write_table(&empty, &[]);
	assert!(!romaneio(vec!["show", "-t", path_arg(&empty)]).status.success());

	// missing file
	let missing = dir.path().join("nada.xlsx");
	assert!(!romaneio(vec!["show", "-t", path_arg(&missing)]).status.success());

	let table = dir.path().join("gabarito.xlsx");
	sample(&table);
	let table = path_arg(&table);

	// run needs both documents
	assert!(!romaneio(vec!["run", "-t", table, "-r", "x.pdf"]).status.success());
	assert!(!romaneio(vec!["gerenciais", "-t", table]).status.success());

	// every command but scan needs a table
	assert!(!romaneio(vec!["show"]).status.success());
}
