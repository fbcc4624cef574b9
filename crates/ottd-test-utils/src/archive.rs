//! Archive builders for content download tests.

use std::io::Write;

use flate2::Compression;
use flate2::write::GzEncoder;

/// Build an uncompressed tar archive containing `files`.
pub fn tar_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for (name, content) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, name, *content)
            .expect("append tar entry");
    }
    builder.into_inner().expect("finish tar archive")
}

/// Gzip-compress `data`.
pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).expect("gzip write");
    encoder.finish().expect("gzip finish")
}

/// A NewGRF archive body as served by the CDN, plus the tar it decompresses to.
pub fn newgrf_archive(name: &str) -> (Vec<u8>, Vec<u8>) {
    let grf = format!("GRF data for {name}");
    let tar = tar_bytes(&[(&format!("{name}/{name}.grf"), grf.as_bytes())]);
    (gzip(&tar), tar)
}
