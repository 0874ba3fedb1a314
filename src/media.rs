// region:    --- Imports
use crate::auction::model::File;

// endregion: --- Imports

// region:    --- Media Urls
pub const AVATARS_FOLDER: &str = "avatars";
pub const LISTINGS_FOLDER: &str = "listings";

/// 저장된 이미지의 공개 URL 생성 (업로드 서명은 범위 밖)
#[derive(Debug, Clone)]
pub struct MediaUrls {
    base: String,
}

impl MediaUrls {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn file_url(&self, folder: &str, file: &File) -> String {
        let extension = file
            .resource_type
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .split('+')
            .next()
            .unwrap_or_default();
        format!("{}/{}/{}.{}", self.base, folder, file.id, extension)
    }
}
// endregion: --- Media Urls
