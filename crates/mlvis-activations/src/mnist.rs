use anyhow::{anyhow, bail, Context, Result};
use byteorder::{BigEndian, ReadBytesExt};
use candle_core::{Device, Tensor};
use flate2::read::GzDecoder;
use std::fs;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

const LABEL_MAGIC: i32 = 2049;
const IMAGE_MAGIC: i32 = 2051;
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Decoded contents of one IDX file.
#[derive(Debug, PartialEq)]
pub struct IdxData {
    pub sizes: Vec<usize>,
    pub data: Vec<u8>,
}

/// Parse an uncompressed IDX1 (labels) or IDX3 (images) buffer.
pub fn parse_idx(bytes: &[u8]) -> Result<IdxData> {
    let mut r = Cursor::new(bytes);
    let magic = r
        .read_i32::<BigEndian>()
        .map_err(|e| anyhow!("Read magic: {}", e))?;
    let ndims = match magic {
        LABEL_MAGIC => 1,
        IMAGE_MAGIC => 3,
        _ => bail!("Invalid IDX magic number: {}", magic),
    };
    let mut sizes = Vec::with_capacity(ndims);
    for _ in 0..ndims {
        let size = r
            .read_i32::<BigEndian>()
            .map_err(|e| anyhow!("Read dimension size: {}", e))?;
        if size < 0 {
            bail!("Negative IDX dimension size: {}", size);
        }
        sizes.push(size as usize);
    }

    let mut data = Vec::new();
    r.read_to_end(&mut data)?;
    let expected: usize = sizes.iter().product();
    if data.len() < expected {
        bail!(
            "IDX payload is truncated: expected {} bytes, found {}",
            expected,
            data.len()
        );
    }
    data.truncate(expected);
    Ok(IdxData { sizes, data })
}

/// Read an IDX file, gunzipping it first when it is gzip-compressed.
pub fn read_idx_file<P: AsRef<Path>>(path: P) -> Result<IdxData> {
    let path = path.as_ref();
    let raw = fs::read(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let bytes = if raw.starts_with(&GZIP_MAGIC) {
        let mut contents = Vec::new();
        GzDecoder::new(raw.as_slice())
            .read_to_end(&mut contents)
            .with_context(|| format!("Gzip read error in {}", path.display()))?;
        contents
    } else {
        raw
    };
    parse_idx(&bytes).with_context(|| format!("Failed to parse IDX file {}", path.display()))
}

/// One MNIST split with pixels scaled to `[0, 1]`.
#[derive(Debug)]
pub struct MnistSplit {
    pub images: Vec<f32>,
    pub labels: Vec<u8>,
    pub rows: usize,
    pub cols: usize,
}

impl MnistSplit {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Images as `(n, 1, rows, cols)` f32 and labels as `(n,)` u32.
    pub fn to_tensors(&self, device: &Device) -> Result<(Tensor, Tensor)> {
        let n = self.len();
        let images = Tensor::from_slice(&self.images, (n, 1, self.rows, self.cols), device)?;
        let labels: Vec<u32> = self.labels.iter().map(|&l| l as u32).collect();
        let labels = Tensor::from_vec(labels, n, device)?;
        Ok((images, labels))
    }
}

fn locate(dir: &Path, name: &str) -> Result<PathBuf> {
    let gz = dir.join(format!("{}.gz", name));
    if gz.exists() {
        return Ok(gz);
    }
    let plain = dir.join(name);
    if plain.exists() {
        return Ok(plain);
    }
    bail!("Could not find {} or {}", gz.display(), plain.display())
}

/// Load the MNIST training or test split from `dir`, accepting either the
/// gzipped or the raw IDX files.
pub fn load_mnist<P: AsRef<Path>>(dir: P, train: bool) -> Result<MnistSplit> {
    let dir = dir.as_ref();
    let prefix = if train { "train" } else { "t10k" };
    let labels = read_idx_file(locate(dir, &format!("{}-labels-idx1-ubyte", prefix))?)?;
    let images = read_idx_file(locate(dir, &format!("{}-images-idx3-ubyte", prefix))?)?;
    if labels.sizes.len() != 1 || images.sizes.len() != 3 {
        bail!("MNIST label/image files are swapped or malformed");
    }

    let (n, rows, cols) = (images.sizes[0], images.sizes[1], images.sizes[2]);
    if labels.sizes[0] != n {
        bail!("{} labels for {} images", labels.sizes[0], n);
    }
    if n == 0 {
        bail!("No MNIST data loaded from {}", dir.display());
    }
    if let Some(bad) = labels.data.iter().find(|&&l| l > 9) {
        bail!("Invalid MNIST label {}", bad);
    }

    log::info!(
        "Loaded {} MNIST {} images ({}x{}) from {}",
        n,
        prefix,
        rows,
        cols,
        dir.display()
    );
    Ok(MnistSplit {
        images: images.data.iter().map(|&b| b as f32 / 255.0).collect(),
        labels: labels.data,
        rows,
        cols,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idx_header(magic: i32, sizes: &[i32]) -> Vec<u8> {
        let mut out = magic.to_be_bytes().to_vec();
        for s in sizes {
            out.extend_from_slice(&s.to_be_bytes());
        }
        out
    }

    #[test]
    fn parses_label_file() {
        let mut bytes = idx_header(2049, &[3]);
        bytes.extend_from_slice(&[7, 2, 1]);
        let idx = parse_idx(&bytes).unwrap();
        assert_eq!(idx.sizes, vec![3]);
        assert_eq!(idx.data, vec![7, 2, 1]);
    }

    #[test]
    fn rejects_bad_magic_and_truncation() {
        assert!(parse_idx(&idx_header(1234, &[1])).is_err());
        let mut bytes = idx_header(2051, &[2, 2, 2]);
        bytes.extend_from_slice(&[0; 5]);
        assert!(parse_idx(&bytes).is_err());
    }

    #[test]
    fn loads_gzipped_split() {
        use flate2::write::GzEncoder;
        use flate2::Compression;
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let write_gz = |name: &str, bytes: &[u8]| {
            let file = fs::File::create(dir.path().join(name)).unwrap();
            let mut enc = GzEncoder::new(file, Compression::default());
            enc.write_all(bytes).unwrap();
            enc.finish().unwrap();
        };

        let mut labels = idx_header(2049, &[2]);
        labels.extend_from_slice(&[3, 8]);
        let mut images = idx_header(2051, &[2, 2, 2]);
        images.extend_from_slice(&[0, 255, 255, 0, 51, 0, 0, 0]);
        write_gz("t10k-labels-idx1-ubyte.gz", &labels);
        write_gz("t10k-images-idx3-ubyte.gz", &images);

        let split = load_mnist(dir.path(), false).unwrap();
        assert_eq!(split.len(), 2);
        assert_eq!(split.labels, vec![3, 8]);
        assert_eq!((split.rows, split.cols), (2, 2));
        assert_eq!(split.images[1], 1.0);
        assert!((split.images[4] - 0.2).abs() < 1e-6);

        let (x, y) = split.to_tensors(&Device::Cpu).unwrap();
        assert_eq!(x.dims(), &[2, 1, 2, 2]);
        assert_eq!(y.to_vec1::<u32>().unwrap(), vec![3, 8]);
    }

    #[test]
    fn missing_training_files_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_mnist(dir.path(), true).unwrap_err().to_string();
        assert!(err.contains("train-labels-idx1-ubyte"));
    }
}
