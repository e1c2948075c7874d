//! In-memory `.docx` builders shared by the unit tests.

use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// A zip archive holding one member.
pub fn zip_with(name: &str, content: &str) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    zip.start_file(name, SimpleFileOptions::default()).unwrap();
    zip.write_all(content.as_bytes()).unwrap();
    zip.finish().unwrap().into_inner()
}

/// Like [`zip_with`], but the member is stored uncompressed.
pub fn stored_zip_with(name: &str, content: &str) -> Vec<u8> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    zip.start_file(name, options).unwrap();
    zip.write_all(content.as_bytes()).unwrap();
    zip.finish().unwrap().into_inner()
}

/// Rewrite the first central directory entry so it claims `size` bytes
/// uncompressed, through a zip64 extended information field.
pub fn forge_uncompressed_size(archive: &[u8], size: u64) -> Vec<u8> {
    const CENTRAL_SIG: &[u8] = b"PK\x01\x02";
    const END_SIG: &[u8] = b"PK\x05\x06";
    let find = |sig: &[u8]| archive.windows(4).rposition(|w| w == sig).unwrap();
    let u16_at = |at: usize| u16::from_le_bytes([archive[at], archive[at + 1]]) as usize;

    let central = find(CENTRAL_SIG);
    let name_len = u16_at(central + 28);
    let extra_len = u16_at(central + 30);
    let extra_end = central + 46 + name_len + extra_len;

    let mut zip64 = vec![0x01, 0x00, 0x08, 0x00];
    zip64.extend_from_slice(&size.to_le_bytes());

    let mut forged = archive[..extra_end].to_vec();
    forged[central + 24..central + 28].copy_from_slice(&u32::MAX.to_le_bytes());
    forged[central + 30..central + 32]
        .copy_from_slice(&((extra_len + zip64.len()) as u16).to_le_bytes());
    forged.extend_from_slice(&zip64);
    forged.extend_from_slice(&archive[extra_end..]);

    let end = forged.windows(4).rposition(|w| w == END_SIG).unwrap();
    let directory_len = u32::from_le_bytes(forged[end + 12..end + 16].try_into().unwrap());
    forged[end + 12..end + 16]
        .copy_from_slice(&(directory_len + zip64.len() as u32).to_le_bytes());
    forged
}

/// `word/document.xml` whose `w:body` holds `body_xml`.
pub fn docx_xml(body_xml: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="{W_NS}"><w:body>{body_xml}</w:body></w:document>"#
    )
}

/// A minimal `.docx` whose `w:body` holds `body_xml`.
pub fn docx(body_xml: &str) -> Vec<u8> {
    zip_with(crate::pipeline::docx::DOCUMENT_PART, &docx_xml(body_xml))
}

/// One paragraph with a single run.
pub fn p(text: &str) -> String {
    format!("<w:p><w:r><w:t>{text}</w:t></w:r></w:p>")
}

/// A table, one `w:tr` per row.
pub fn table(rows: &[&[&str]]) -> String {
    let mut xml = String::from("<w:tbl><w:tblPr/>");
    for row in rows {
        xml.push_str("<w:tr>");
        for cell in *row {
            xml.push_str(&format!("<w:tc>{}</w:tc>", p(cell)));
        }
        xml.push_str("</w:tr>");
    }
    xml.push_str("</w:tbl>");
    xml
}

/// Non-blank paragraphs of a complete evaluation report.
pub fn sample_report_paragraphs() -> Vec<String> {
    [
        "兒童職能治療評估報告",
        "姓名：王小明　性別：男　年齡：4歲2個月",
        "評估日期 | 2024/05/01",
        "一、家屬主訴與期待",
        "家長希望孩子能改善握筆姿勢並提升專注力。",
        "二、職能評估",
        "精細動作：□無異常 ■發展遲緩",
        "評估工具：皮巴迪動作發展量表第二版（PDMS-2）",
        "抓握：原始分數 40，百分等級 9",
        "視覺動作整合：原始分數 95，百分等級 16",
        "行為觀察及綜合結果：",
        "以手掌抓握蠟筆，仿畫十字困難。",
        "剪刀使用不穩定，無法沿線剪。",
        "感覺統合：□無異常 ■發展遲緩",
        "■感覺處理能力剖析量表",
        "■臨床觀察",
        "行為觀察及綜合結果：",
        "對觸覺刺激較敏感，排斥沾黏材質。",
        "日常生活自理：",
        "飲食：■無異常 □發展遲緩",
        "行為觀察及綜合結果：",
        "可自行使用湯匙進食，偶有掉落。",
        "穿脫衣：□無異常 ■發展遲緩",
        "行為觀察及綜合結果：",
        "需協助扣釦子。",
        "盥洗衛生：■無異常 □發展遲緩",
        "行為觀察及綜合結果：",
        "可在提醒下洗手。",
        "遊戲活動：■無異常 □發展遲緩",
        "行為觀察及綜合結果：",
        "喜歡建構類遊戲。",
        "生活作息及參與：■無異常 □發展遲緩",
        "備註：無",
        "行為觀察及綜合結果：",
        "作息規律，可參與團體活動。",
        "其他：",
        "認知發展符合年齡。",
        "三、問題分析",
        "手部精細動作控制不佳。",
        "觸覺防禦影響活動參與。",
        "綜合以上，建議接受職能治療。",
        "四、總結與建議",
        "精細動作部分：",
        "每日進行串珠練習。",
        "認知發展：",
        "維持親子共讀。",
        "感覺統合部分：",
        "提供多元觸覺遊戲。",
        "人際互動部分：",
        "安排同儕遊戲。",
        "職能治療師：陳OO",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// The sample report as a `.docx`, with a table and blank paragraphs mixed in.
pub fn sample_report_docx() -> Vec<u8> {
    let paragraphs = sample_report_paragraphs();
    let mut body = String::new();
    for (i, para) in paragraphs.iter().enumerate() {
        if i == 2 {
            // the third line comes from a table row
            body.push_str(&table(&[&["評估日期", "2024/05/01"]]));
        } else {
            body.push_str(&p(para));
        }
        if i == 0 || i == 5 {
            body.push_str("<w:p/>");
        }
    }
    body.push_str("<w:sectPr/>");
    docx(&body)
}
