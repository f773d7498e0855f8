use bytes::Bytes;
use thiserror::Error;

/// Extensions accepted for the primary file of a non-archive upload.
pub const SPATIAL_EXTENSIONS: &[&str] = &[".shp", ".tif", ".tiff", ".geotif", ".geotiff"];

/// Errors raised while validating or staging an upload bundle.
///
/// Everything except `Staging` is detected before any I/O happens; the whole
/// bundle is accepted or rejected, never partially.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Only Shapefiles and GeoTIFFs are supported. You uploaded a {0} file")]
    UnsupportedFileType(String),

    #[error("When uploading Shapefiles, .SHX and .DBF files are also required.")]
    MissingCompanion,

    #[error(
        "It looks like you're uploading components from different Shapefiles. \
         Please double-check your file selections."
    )]
    BundleMismatch,

    #[error("the permissions field must be valid JSON: {0}")]
    MalformedPermissions(#[source] serde_json::Error),

    #[error("failed to write upload to staging: {0}")]
    Staging(#[from] std::io::Error),
}

/// One uploaded multipart part: the submitted filename plus its full content.
#[derive(Debug, Clone)]
pub struct FilePart {
    pub file_name: String,
    pub content: Bytes,
}

impl FilePart {
    pub fn new(file_name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
        }
    }

    /// Filename without its final extension.
    pub fn base_name(&self) -> &str {
        split_extension(&self.file_name).0
    }
}

/// The raw file parts of one upload submission, before validation.
///
/// Only the base file is mandatory; which companions must accompany it
/// depends on its extension and is decided by [`UploadBundle::validate`].
#[derive(Debug, Clone)]
pub struct UploadBundle {
    pub base_file: FilePart,
    pub dbf_file: Option<FilePart>,
    pub shx_file: Option<FilePart>,
    pub prj_file: Option<FilePart>,
    pub xml_file: Option<FilePart>,
    pub sld_file: Option<FilePart>,
}

/// What the primary file turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleKind {
    /// Pre-packaged `.zip`; accepted without inspecting the archive contents.
    Archive,
    Shapefile,
    GeoTiff,
}

/// A bundle that passed every consistency rule.
///
/// Parts are held in the fixed staging order (base, dbf, shx, prj, sld, xml)
/// with the metadata filename already normalized. Only constructible through
/// [`UploadBundle::validate`].
#[derive(Debug, Clone)]
pub struct ValidatedBundle {
    kind: BundleKind,
    base_name: String,
    parts: Vec<FilePart>,
}

impl ValidatedBundle {
    pub fn kind(&self) -> BundleKind {
        self.kind
    }

    /// Base name shared by every file in the bundle.
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub fn base_file(&self) -> &FilePart {
        &self.parts[0]
    }

    /// All present parts in staging order, base file first.
    pub fn parts(&self) -> &[FilePart] {
        &self.parts
    }
}

impl UploadBundle {
    /// Checks the bundle for structural consistency.
    ///
    /// Pure and synchronous: borrows the bundle, performs no I/O, and returns
    /// the same outcome every time for the same input. Content handles are
    /// reference-counted, so cloning parts into the result is cheap.
    pub fn validate(&self) -> Result<ValidatedBundle, UploadError> {
        let (base_name, base_ext) = split_extension(&self.base_file.file_name);
        let ext = base_ext.to_ascii_lowercase();

        let kind = match ext.as_str() {
            ".zip" => BundleKind::Archive,
            ".shp" => BundleKind::Shapefile,
            e if SPATIAL_EXTENSIONS.contains(&e) => BundleKind::GeoTiff,
            _ => return Err(UploadError::UnsupportedFileType(ext)),
        };

        let mut xml_file = self.xml_file.clone();

        // An archive is assumed self-consistent; unpacking and verifying it
        // is the downstream pipeline's job.
        if kind != BundleKind::Archive {
            if kind == BundleKind::Shapefile {
                let (Some(dbf), Some(shx)) = (&self.dbf_file, &self.shx_file) else {
                    return Err(UploadError::MissingCompanion);
                };
                if dbf.base_name() != base_name || shx.base_name() != base_name {
                    return Err(UploadError::BundleMismatch);
                }
            }

            if let Some(prj) = &self.prj_file {
                if prj.base_name() != base_name {
                    return Err(UploadError::BundleMismatch);
                }
            }

            if let Some(xml) = xml_file.take() {
                xml_file = Some(match normalized_metadata_name(base_name, &xml.file_name) {
                    Some(renamed) => FilePart {
                        file_name: renamed,
                        content: xml.content,
                    },
                    None => xml,
                });
            }
        }

        let mut parts = vec![self.base_file.clone()];
        parts.extend(self.dbf_file.clone());
        parts.extend(self.shx_file.clone());
        parts.extend(self.prj_file.clone());
        parts.extend(self.sld_file.clone());
        parts.extend(xml_file);

        Ok(ValidatedBundle {
            kind,
            base_name: base_name.to_string(),
            parts,
        })
    }
}

/// Filename policy for a metadata sidecar whose base name disagrees with the
/// primary file.
///
/// A name like `roads.shp.xml` would collide with the staged `roads.shp` once
/// both land in the same directory, so it is renamed to `<base>.xml`. Any
/// other mismatched name is kept as submitted and no error is raised.
pub fn normalized_metadata_name(base_name: &str, xml_name: &str) -> Option<String> {
    if split_extension(xml_name).0 == base_name {
        return None;
    }
    xml_name.contains(".shp").then(|| format!("{base_name}.xml"))
}

/// Splits a filename into (stem, extension) at the last dot, keeping the dot
/// on the extension. A name with no dot, or nothing but a leading dot, has no
/// extension.
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    }
}
