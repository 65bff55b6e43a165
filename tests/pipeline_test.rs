//! End-to-end tests for the mixing pipeline.

use exammix::container::read_archive;
use exammix::model::{element_text, Element};
use exammix::shuffle::shuffle_exam;
use exammix::{
    ContentNode, Error, ExamDocument, ExamMixer, ExamParser, FixedPermuter, IssueKind, MixOptions,
    SectionKind, SeededPermuter,
};

/// Build template bytes from body lines.
fn template(lines: &[&str]) -> Vec<u8> {
    let mut doc = ExamDocument::blank().unwrap();
    for line in lines {
        doc.body_mut().push(ContentNode::with_text(*line));
    }
    doc.to_bytes().unwrap()
}

fn full_template() -> Vec<u8> {
    template(&[
        "SỞ GIÁO DỤC VÀ ĐÀO TẠO",
        "[P1] PHẦN I. Trắc nghiệm nhiều lựa chọn",
        "Câu 1: Thủ đô của Việt Nam là",
        "A. Huế",
        "B. Hà Nội*",
        "C. Đà Nẵng",
        "D. Sài Gòn",
        "Câu 2: 2 + 3 = ?",
        "A. 4",
        "B. 6",
        "C. 5 (đúng)",
        "D. 7",
        "Câu 3: Số nguyên tố nhỏ nhất là",
        "*A. 2",
        "B. 3",
        "C. 5",
        "D. 7",
        "[P2] PHẦN II. Trắc nghiệm đúng sai",
        "Câu 1: Xét hàm số y = x²",
        "a) Hàm số chẵn*",
        "b) Hàm số đồng biến trên R",
        "c) Đồ thị đi qua gốc tọa độ*",
        "d) Giá trị nhỏ nhất bằng 1",
        "[P3] PHẦN III. Trả lời ngắn",
        "Câu 1: Tính 2^10",
        "Key: 1024",
        "Câu 2: Tính 3!",
        "Đáp án: 6",
        "[P4] PHẦN IV. Tự luận",
        "Câu 1: Chứng minh định lí Pytago",
        "HẾT",
    ])
}

fn variant_parts(bundle_file: &[u8]) -> Vec<(String, Vec<u8>)> {
    read_archive(bundle_file).unwrap()
}

#[test]
fn test_same_seed_same_output() {
    let data = full_template();
    let options = MixOptions::new().with_count(3).with_seed(2024);

    let parallel = ExamMixer::new(options.clone()).generate(&data).unwrap();
    let sequential = ExamMixer::new(options).sequential().generate(&data).unwrap();

    assert_eq!(parallel.answer_key, sequential.answer_key);
    assert_eq!(parallel.file_names(), sequential.file_names());
    for name in ["De_Ma_101.docx", "De_Ma_102.docx", "De_Ma_103.docx"] {
        assert_eq!(
            variant_parts(parallel.file(name).unwrap()),
            variant_parts(sequential.file(name).unwrap())
        );
    }
}

#[test]
fn test_answer_key_shape() {
    let bundle = ExamMixer::new(MixOptions::new().with_count(2).with_seed(1))
        .generate(&full_template())
        .unwrap();

    assert_eq!(bundle.stats.questions, [3, 1, 2, 1]);
    for variant in &bundle.answer_key.variants {
        assert_eq!(variant.entries.len(), 6);
        for entry in &variant.entries {
            match entry.section {
                SectionKind::MultipleChoice => {
                    assert!(["A", "B", "C", "D"].contains(&entry.answer.as_str()));
                    assert_eq!(entry.score, "0.25");
                }
                SectionKind::TrueFalse => {
                    assert_eq!(entry.answer.chars().count(), 4);
                    assert!(entry.answer.chars().all(|c| c == 'Đ' || c == 'S'));
                    assert_eq!(entry.answer.chars().filter(|c| *c == 'Đ').count(), 2);
                }
                SectionKind::ShortAnswer => {
                    assert!(["1024", "6"].contains(&entry.answer.as_str()));
                }
                SectionKind::Essay => panic!("essay questions are not keyed"),
            }
        }
    }
}

#[test]
fn test_exactly_one_correct_option_per_question() {
    let data = full_template();
    for seed in 0..20 {
        let mut exam = ExamParser::from_bytes(&data).unwrap().parse().exam;
        let issues = shuffle_exam(&mut exam, &mut SeededPermuter::from_seed(seed));
        assert!(issues.is_empty());

        for question in &exam.section(SectionKind::MultipleChoice).questions {
            assert_eq!(question.choices.len(), 4);
            let correct: Vec<usize> = question
                .choices
                .iter()
                .enumerate()
                .filter(|(_, c)| c.is_correct)
                .map(|(i, _)| i)
                .collect();
            assert_eq!(correct.len(), 1);

            let label = ['A', 'B', 'C', 'D'][correct[0]].to_string();
            assert_eq!(question.answer.as_deref(), Some(label.as_str()));
            assert!(question.choices[correct[0]].first_text().starts_with(&label));

            let text = question.choices[correct[0]].first_text();
            assert!(["Hà Nội", "5", "2"].iter().any(|t| text.trim_end().ends_with(t)));
            assert!(!text.contains('*') && !text.contains("(đúng)"));
        }
    }
}

#[test]
fn test_correct_option_label_in_document() {
    let data = template(&[
        "[P1] PHẦN I",
        "Câu 1: 1 + 1 = ?",
        "A. 1",
        "B. 2*",
        "C. 3",
        "D. 4",
    ]);
    let bundle = ExamMixer::new(MixOptions::new().with_count(4).with_seed(99))
        .generate(&data)
        .unwrap();

    for variant in &bundle.answer_key.variants {
        let answer = &variant.entries[0].answer;
        let doc = ExamDocument::from_bytes(
            bundle
                .file(&format!("De_Ma_{}.docx", variant.code))
                .unwrap(),
        )
        .unwrap();

        let mut cells: Vec<&Element> = Vec::new();
        for node in doc.body() {
            node.element().descendants_where(&|e| e.is("w:tc"), &mut cells);
        }
        let correct: Vec<String> = cells
            .iter()
            .map(|c| element_text(c))
            .filter(|t| t.ends_with(". 2"))
            .collect();
        assert_eq!(correct, vec![format!("{}. 2", answer)]);
    }
}

#[test]
fn test_true_false_fixed_permutation() {
    let data = template(&[
        "[P2] PHẦN II",
        "Câu 1: Xét các mệnh đề",
        "a) p*",
        "b) q",
        "c) r*",
        "d) s",
    ]);
    let mut exam = ExamParser::from_bytes(&data).unwrap().parse().exam;
    let mut permuter = FixedPermuter::new(vec![vec![2, 0, 3, 1]]);
    assert!(shuffle_exam(&mut exam, &mut permuter).is_empty());

    let question = &exam.section(SectionKind::TrueFalse).questions[0];
    assert_eq!(question.answer.as_deref(), Some("ĐĐSS"));
    let texts: Vec<String> = question.choices.iter().map(|c| c.first_text()).collect();
    assert_eq!(texts, vec!["a) r", "b) p", "c) s", "d) q"]);
}

#[test]
fn test_missing_answer_aborts_batch() {
    let data = template(&[
        "[P1] PHẦN I",
        "Câu 1: Chọn đáp án đúng",
        "A. x",
        "B. y*",
        "C. z",
        "D. w",
        "Câu 2: Chọn đáp án đúng",
        "A. x",
        "B. y",
        "C. z",
        "D. w",
    ]);
    let err = ExamMixer::new(MixOptions::new().with_count(3).with_seed(3))
        .generate(&data)
        .unwrap_err();

    assert!(err.is_validation());
    let issues = err.issues();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].section, SectionKind::MultipleChoice);
    assert_eq!(issues[0].kind, IssueKind::MissingAnswer);
    assert!(issues[0].question.starts_with("Câu 2"));
}

#[test]
fn test_choice_count_and_missing_answer_line() {
    let data = template(&[
        "[P1] PHẦN I",
        "Câu 1: Thiếu phương án",
        "A. x*",
        "B. y",
        "C. z",
        "[P3] PHẦN III",
        "Câu 1: Không có đáp án",
    ]);
    let err = ExamMixer::default().generate(&data).unwrap_err();
    let kinds: Vec<&IssueKind> = err.issues().iter().map(|i| &i.kind).collect();
    assert_eq!(
        kinds,
        vec![&IssueKind::ChoiceCount { found: 3 }, &IssueKind::MissingAnswerLine]
    );
    assert!(err.to_string().contains("2 issue"));
}

#[test]
fn test_short_options_laid_out_in_a_row() {
    let data = template(&[
        "[P1] PHẦN I",
        "Câu 1: Chọn từ",
        "A. abc",
        "B. abcd*",
        "C. abcde",
        "D. abcdef",
    ]);
    let bundle = ExamMixer::new(MixOptions::new().with_seed(8))
        .generate(&data)
        .unwrap();
    assert_eq!(bundle.stats.layouts.row, 1);

    let doc = ExamDocument::from_bytes(bundle.file("De_Ma_101.docx").unwrap()).unwrap();
    let option_table = doc
        .body()
        .iter()
        .filter(|n| n.element().is("w:tbl"))
        .find(|n| n.plain_text().contains("abcdef"))
        .unwrap();
    let rows: Vec<&Element> = option_table.element().elements().filter(|e| e.is("w:tr")).collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].elements().filter(|e| e.is("w:tc")).count(), 4);
}

#[test]
fn test_renumbering_and_structure() {
    let bundle = ExamMixer::new(MixOptions::new().with_seed(5))
        .generate(&full_template())
        .unwrap();
    let doc = ExamDocument::from_bytes(bundle.file("De_Ma_101.docx").unwrap()).unwrap();
    let lines: Vec<String> = doc.body().iter().map(ContentNode::plain_text).collect();

    let labels: Vec<&String> = lines.iter().filter(|l| l.starts_with("Câu ")).collect();
    let prefixes: Vec<&str> = labels.iter().map(|l| &l[..l.find(':').unwrap()]).collect();
    assert_eq!(
        prefixes,
        vec!["Câu 1", "Câu 2", "Câu 3", "Câu 1", "Câu 1", "Câu 2", "Câu 1"]
    );

    assert!(lines.iter().any(|l| l == "PHẦN I. Trắc nghiệm nhiều lựa chọn"));
    assert!(!lines.iter().any(|l| l.contains("[P")));
    assert!(!lines.iter().any(|l| l.starts_with("Key:") || l.starts_with("Đáp án:")));
    assert!(!lines.iter().any(|l| l.contains("SỞ GIÁO DỤC VÀ ĐÀO TẠO")));
    assert_eq!(lines.iter().filter(|l| l.as_str() == "---Hết---").count(), 1);
    assert!(lines.iter().any(|l| l.contains("Chứng minh định lí Pytago")));
}

#[test]
fn test_instruction_paragraph_keeps_formatting() {
    let instruction = "Mỗi câu trong phần này chỉ chọn một phương án.";
    let data = template(&[
        "[P1] PHẦN I",
        instruction,
        "Câu 1: 1 + 1 = ?",
        "A. 1",
        "B. 2*",
        "C. 3",
        "D. 4",
    ]);
    let bundle = ExamMixer::new(MixOptions::new().with_seed(4))
        .generate(&data)
        .unwrap();
    let doc = ExamDocument::from_bytes(bundle.file("De_Ma_101.docx").unwrap()).unwrap();

    let is_bold = |node: &ContentNode| node.element().any_descendant(&|e| e.is("w:b"));
    let heading = doc.body().iter().find(|n| n.plain_text() == "PHẦN I").unwrap();
    let note = doc.body().iter().find(|n| n.plain_text() == instruction).unwrap();
    assert!(is_bold(heading));
    assert!(!is_bold(note));
}

#[test]
fn test_keep_numbering() {
    let data = template(&[
        "[P3] PHẦN III",
        "Câu 7: Tính 1 + 1",
        "Key: 2",
    ]);
    let bundle = ExamMixer::new(MixOptions::new().keep_numbering())
        .generate(&data)
        .unwrap();
    let doc = ExamDocument::from_bytes(bundle.file("De_Ma_101.docx").unwrap()).unwrap();
    assert!(doc
        .body()
        .iter()
        .any(|n| n.plain_text() == "Câu 7: Tính 1 + 1"));
}

#[test]
fn test_not_a_docx() {
    let err = ExamMixer::default().generate(b"plain text").unwrap_err();
    assert!(matches!(err, Error::UnknownFormat));
    assert!(!err.is_validation());
}
