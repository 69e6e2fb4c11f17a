//! 流式传输的帧格式：负载之后紧跟固定的结束标记

use crate::{ArithError, Result};

use slog::Logger;
use std::io::{ErrorKind, Read, Write};

/// 每个负载末尾追加的结束标记
pub const END_SEQUENCE: &[u8] = b"En_un_lugar_de_la_Mancha,_de_cuyo_nombre_no_quiero_acordarme\
_no_ha_mucho_tiempo_que_vivia_un_hidalgo\
_de_los_de_lanza_en_astillero_adarga_antigua\
_rocin_flaco_y_galgo_corredor";

/// 写出负载与结束标记
pub fn write_frame<W: Write>(writer: &mut W, payload: &[u8]) -> Result<()> {
    writer.write_all(payload)?;
    writer.write_all(END_SEQUENCE)?;
    writer.flush()?;
    Ok(())
}

/// 按 `block_size` 分块读取，直到缓冲区以结束标记结尾，返回去掉标记的负载
///
/// # Errors
///
/// 对端在发送结束标记之前关闭连接时返回 `ArithError::UnexpectedEof`。
pub fn read_frame<R: Read>(reader: &mut R, block_size: usize, logger: &Logger) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    let mut chunk = vec![0; block_size.max(1)];
    let mut chunks = 0;

    while !data.ends_with(END_SEQUENCE) {
        let len = match reader.read(&mut chunk) {
            Ok(0) => return Err(ArithError::UnexpectedEof),
            Ok(len) => len,
            Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        chunks += 1;
        debug!(logger, " ... chunk read ... {}", chunks);
        data.extend_from_slice(&chunk[..len]);
    }

    data.truncate(data.len() - END_SEQUENCE.len());
    Ok(data)
}
