//! 把客户端发来的负载解码为表达式列表
//!
//! 负载可以是纯文本，也可以是 zip 压缩包（取第一个文件的内容）。

use crate::{ArithError, Result};

use std::fmt;
use std::io::{Cursor, Read};
use zip::ZipArchive;

const ZIP_SIGNATURE: &[u8] = b"PK\x03\x04";

/// 负载格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// zip 压缩包
    Zip,
    /// 纯文本
    Text,
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputFormat::Zip => f.write_str("zip"),
            InputFormat::Text => f.write_str("text"),
        }
    }
}

/// 识别负载格式并返回其中的文本
pub fn decode_payload(data: Vec<u8>) -> Result<(InputFormat, String)> {
    if !data.starts_with(ZIP_SIGNATURE) {
        return Ok((InputFormat::Text, String::from_utf8(data)?));
    }

    let mut archive = ZipArchive::new(Cursor::new(data))?;
    if archive.len() == 0 {
        return Err(ArithError::EmptyArchive);
    }

    let mut member = archive.by_index(0)?;
    let mut text = String::new();
    member.read_to_string(&mut text)?;
    Ok((InputFormat::Zip, text))
}

/// 按行切分，去掉每行首尾空白并丢弃空行
pub fn split_expressions(text: &str) -> Vec<String> {
    text.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    fn zipped(name: &str, contents: &str) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file(name, FileOptions::<'_, ()>::default()).unwrap();
        zip.write_all(contents.as_bytes()).unwrap();
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn plain_text_payload() {
        let (format, text) = decode_payload(b"1 + 1\n".to_vec()).unwrap();
        assert_eq!(format, InputFormat::Text);
        assert_eq!(text, "1 + 1\n");
    }

    #[test]
    fn zip_payload_reads_first_member() {
        let (format, text) = decode_payload(zipped("operations.txt", "2 * 3\n4 - 1\n")).unwrap();
        assert_eq!(format, InputFormat::Zip);
        assert_eq!(split_expressions(&text), vec!["2 * 3", "4 - 1"]);
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        match decode_payload(vec![0xff, 0xfe, b'1']) {
            Err(ArithError::Utf8(_)) => {}
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn blank_lines_are_dropped() {
        let lines = split_expressions("\n 1 + 1 \n\n   \n2 * 2\r\n");
        assert_eq!(lines, vec!["1 + 1", "2 * 2"]);
    }
}
