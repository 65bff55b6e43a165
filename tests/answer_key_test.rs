//! Integration tests for answer-key projections.

use exammix::container::{read_archive, KeyCell};
use exammix::key::{
    answers_from_horizontal, answers_from_vertical, GRADING_FILE, HORIZONTAL_FILE, VERTICAL_FILE,
};
use exammix::{ContentNode, ExamDocument, ExamMixer, MixBundle, MixOptions, SectionKind};

fn generate(count: u32, seed: u64) -> MixBundle {
    let mut doc = ExamDocument::blank().unwrap();
    for line in [
        "[P1] PHẦN I",
        "Câu 1: Chọn số chẵn",
        "A. 1",
        "B. 3",
        "C. 4*",
        "D. 5",
        "Câu 2: Chọn số lẻ",
        "A. 2",
        "B. 9*",
        "C. 4",
        "D. 6",
        "[P2] PHẦN II",
        "Câu 1: Xét các số",
        "a) 2 là số chẵn*",
        "b) 3 là số chẵn",
        "c) 5 là số lẻ*",
        "d) 7 là số chẵn",
        "[P3] PHẦN III",
        "Câu 1: 6 x 7 = ?",
        "Key: 42",
    ] {
        doc.body_mut().push(ContentNode::with_text(line));
    }
    let data = doc.to_bytes().unwrap();
    ExamMixer::new(MixOptions::new().with_count(count).with_seed(seed))
        .generate(&data)
        .unwrap()
}

#[test]
fn test_vertical_and_horizontal_agree() {
    let bundle = generate(4, 77);
    let key = &bundle.answer_key;

    let vertical = answers_from_vertical(&key.vertical());
    let horizontal = answers_from_horizontal(&key.horizontal());
    assert_eq!(vertical.len(), 4 * 4);
    assert_eq!(vertical, horizontal);

    for ((code, question), answer) in &vertical {
        assert_eq!(key.answer(code, *question), Some(answer.as_str()));
    }
}

#[test]
fn test_written_vertical_workbook_holds_every_answer() {
    let bundle = generate(3, 21);
    let entries = read_archive(bundle.file(VERTICAL_FILE).unwrap()).unwrap();
    let strings = entries
        .iter()
        .find(|(n, _)| n == "xl/sharedStrings.xml")
        .map(|(_, d)| String::from_utf8_lossy(d).into_owned())
        .unwrap();

    for variant in &bundle.answer_key.variants {
        assert!(strings.contains(&format!("<t>{}</t>", variant.code)));
        for entry in &variant.entries {
            assert!(
                strings.contains(&format!("<t>{}</t>", entry.answer)),
                "answer {} of variant {} missing from the workbook",
                entry.answer,
                variant.code
            );
        }
    }
}

#[test]
fn test_question_numbers_are_one_counter() {
    let bundle = generate(2, 3);
    for variant in &bundle.answer_key.variants {
        let numbers: Vec<u32> = variant.entries.iter().map(|e| e.question).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
        let sections: Vec<SectionKind> = variant.entries.iter().map(|e| e.section).collect();
        assert_eq!(
            sections,
            vec![
                SectionKind::MultipleChoice,
                SectionKind::MultipleChoice,
                SectionKind::TrueFalse,
                SectionKind::ShortAnswer,
            ]
        );
        assert_eq!(variant.entries[3].answer, "42");
    }
}

#[test]
fn test_grading_platform_rows() {
    let bundle = generate(3, 12);
    let sheet = bundle.answer_key.grading_platform();

    // three header rows, one row per variant
    assert_eq!(sheet.row_count(), 6);
    let labels: Vec<String> = sheet.rows[1].iter().map(KeyCell::display).collect();
    assert_eq!(labels, vec!["", "1", "2", "1a", "1b", "1c", "1d", "Câu 1"]);

    for (row, variant) in sheet.rows[3..].iter().zip(&bundle.answer_key.variants) {
        let cells: Vec<String> = row.iter().map(KeyCell::display).collect();
        assert_eq!(cells[0], variant.code);
        assert_eq!(cells[1], variant.entries[0].answer);
        assert_eq!(cells[3..7].concat(), variant.entries[2].answer);
        assert_eq!(cells[7], "42");
    }
}

#[test]
fn test_key_files_are_workbooks() {
    let bundle = generate(2, 5);
    for (name, title) in [
        (VERTICAL_FILE, "Dap An Doc"),
        (HORIZONTAL_FILE, "Dap An Ngang"),
        (GRADING_FILE, "Dap An OLM"),
    ] {
        let entries = read_archive(bundle.file(name).unwrap()).unwrap();
        let workbook = entries
            .iter()
            .find(|(n, _)| n == "xl/workbook.xml")
            .map(|(_, d)| String::from_utf8_lossy(d).into_owned())
            .unwrap();
        assert!(workbook.contains(title), "{} should name its sheet {}", name, title);
    }
}

#[test]
fn test_bundle_zip_contains_everything() {
    let bundle = generate(2, 9);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Tap_De_Thi.zip");
    bundle.write_zip(&path).unwrap();

    let entries = read_archive(&std::fs::read(&path).unwrap()).unwrap();
    let names: Vec<&str> = entries.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "De_Ma_101.docx",
            "De_Ma_102.docx",
            VERTICAL_FILE,
            HORIZONTAL_FILE,
            GRADING_FILE,
        ]
    );
}
