use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::bundle::{UploadError, ValidatedBundle};

/// A bundle written out for the import pipeline.
///
/// The directory belongs to whoever receives this value; the stager never
/// deletes it, and the importer is expected to reclaim it once ingestion
/// finishes.
#[derive(Debug)]
pub struct StagedUpload {
    pub directory: PathBuf,
    /// Absolute path of the staged primary file inside `directory`.
    pub base_file_path: PathBuf,
}

/// Writes every part of a validated bundle into a freshly created staging
/// directory and returns the handoff paths.
///
/// The directory name is allocated by `tempfile`, so concurrent uploads can
/// never contend for the same path. It is detached from its guard before the
/// first write, which means a mid-write failure (disk full, permissions)
/// propagates the I/O error and leaves the partial directory in place.
pub fn stage_bundle(
    bundle: &ValidatedBundle,
    staging_root: Option<&Path>,
) -> Result<StagedUpload, UploadError> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("layer_upload_");
    let tempdir = match staging_root {
        Some(root) => builder.tempdir_in(root)?,
        None => builder.tempdir()?,
    };
    let directory = tempdir.keep();

    for part in bundle.parts() {
        let path = directory.join(&part.file_name);
        let mut file = File::create(&path)?;
        file.write_all(&part.content)?;
        file.flush()?;
    }

    tracing::debug!(
        files = bundle.parts().len(),
        directory = %directory.display(),
        "bundle staged"
    );

    let base_file_path = directory.join(&bundle.base_file().file_name);
    Ok(StagedUpload {
        directory,
        base_file_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::bundle::{FilePart, UploadBundle, ValidatedBundle};

    fn part(name: &str, content: &str) -> FilePart {
        FilePart::new(name, content.as_bytes().to_vec())
    }

    fn validated_shapefile() -> ValidatedBundle {
        UploadBundle {
            base_file: part("parcels.shp", "shape records"),
            dbf_file: Some(part("parcels.dbf", "attribute table")),
            shx_file: Some(part("parcels.shx", "shape index")),
            prj_file: None,
            xml_file: Some(part("parcels.shp.xml", "<metadata/>")),
            sld_file: None,
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn test_stages_exactly_the_present_parts() {
        let staged = stage_bundle(&validated_shapefile(), None).unwrap();

        let mut names: Vec<String> = std::fs::read_dir(&staged.directory)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        // The mismatched metadata sidecar lands under its normalized name.
        assert_eq!(names, ["parcels.dbf", "parcels.shp", "parcels.shx", "parcels.xml"]);

        std::fs::remove_dir_all(&staged.directory).unwrap();
    }

    #[test]
    fn test_base_file_path_is_inside_directory() {
        let staged = stage_bundle(&validated_shapefile(), None).unwrap();

        assert!(staged.base_file_path.exists());
        assert!(staged.base_file_path.starts_with(&staged.directory));
        assert_eq!(
            std::fs::read_to_string(&staged.base_file_path).unwrap(),
            "shape records"
        );

        std::fs::remove_dir_all(&staged.directory).unwrap();
    }

    #[test]
    fn test_directory_survives_after_staging() {
        // Ownership of the directory transfers to the caller; nothing is
        // dropped or reclaimed when the staging call returns.
        let staged = stage_bundle(&validated_shapefile(), None).unwrap();
        assert!(staged.directory.is_dir());
        std::fs::remove_dir_all(&staged.directory).unwrap();
    }

    #[test]
    fn test_stages_under_configured_root() {
        let root = tempfile::tempdir().unwrap();
        let staged = stage_bundle(&validated_shapefile(), Some(root.path())).unwrap();
        assert!(staged.directory.starts_with(root.path()));
    }

    #[test]
    fn test_distinct_uploads_get_distinct_directories() {
        let bundle = validated_shapefile();
        let first = stage_bundle(&bundle, None).unwrap();
        let second = stage_bundle(&bundle, None).unwrap();
        assert_ne!(first.directory, second.directory);

        std::fs::remove_dir_all(&first.directory).unwrap();
        std::fs::remove_dir_all(&second.directory).unwrap();
    }

    #[test]
    fn test_missing_staging_root_propagates_io_error() {
        let bundle = validated_shapefile();
        let err = stage_bundle(&bundle, Some(Path::new("/nonexistent/staging/root"))).unwrap_err();
        assert!(matches!(err, UploadError::Staging(_)));
    }
}
