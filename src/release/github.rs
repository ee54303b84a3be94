//! GitHub Release API 기반 업데이트 소스

use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::{default_staging_dir, ReleaseAsset, ReleaseCheck, ReleaseError, ReleaseSource};
use crate::config::ReleaseConfig;
use showcase_updater::ReleaseVersion;

const DEFAULT_API_BASE: &str = "https://api.github.com";

/// GitHub Release 응답 (필요한 필드만)
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRelease {
    pub tag_name: String,
    pub name: Option<String>,
    pub body: Option<String>,
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub draft: bool,
    pub published_at: Option<String>,
    pub html_url: Option<String>,
    #[serde(default)]
    pub assets: Vec<GitHubAsset>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubAsset {
    pub name: String,
    #[serde(default)]
    pub size: u64,
    pub browser_download_url: String,
}

impl From<&GitHubAsset> for ReleaseAsset {
    fn from(asset: &GitHubAsset) -> Self {
        Self {
            name: asset.name.clone(),
            size: asset.size,
            download_url: asset.browser_download_url.clone(),
        }
    }
}

pub struct GitHubReleaseSource {
    owner: String,
    repo: String,
    http: reqwest::Client,
    /// API 베이스 URL (기본: "https://api.github.com")
    base_url: String,
    current_version: ReleaseVersion,
    staging_dir: PathBuf,
    include_prerelease: bool,
}

impl GitHubReleaseSource {
    pub fn new(config: &ReleaseConfig, current_version: &str) -> Result<Self, ReleaseError> {
        let current_version = ReleaseVersion::parse(current_version)
            .ok_or_else(|| ReleaseError::InvalidTag(current_version.to_string()))?;

        let http = reqwest::Client::builder()
            .user_agent(concat!("showcase-updater/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            owner: config.github_owner.trim().to_string(),
            repo: config.github_repo.trim().to_string(),
            http,
            base_url: config
                .api_base_url
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(DEFAULT_API_BASE)
                .trim_end_matches('/')
                .to_string(),
            current_version,
            staging_dir: config
                .staging_dir
                .as_ref()
                .map(PathBuf::from)
                .unwrap_or_else(default_staging_dir),
            include_prerelease: config.include_prerelease,
        })
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, ReleaseError> {
        let response = self
            .http
            .get(url)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ReleaseError::Api { status, body });
        }
        Ok(response.json().await?)
    }

    /// 최신 릴리스. 프리릴리스를 허용하면 목록에서 draft가 아닌 첫 항목
    pub async fn fetch_latest_release(&self) -> Result<GitHubRelease, ReleaseError> {
        if !self.include_prerelease {
            let url = format!("{}/repos/{}/{}/releases/latest", self.base_url, self.owner, self.repo);
            return self.get_json(&url).await;
        }

        let url = format!("{}/repos/{}/{}/releases?per_page=10", self.base_url, self.owner, self.repo);
        let releases: Vec<GitHubRelease> = self.get_json(&url).await?;
        releases
            .into_iter()
            .find(|r| !r.draft)
            .ok_or(ReleaseError::Api {
                status: 404,
                body: "No published releases".to_string(),
            })
    }
}

#[async_trait]
impl ReleaseSource for GitHubReleaseSource {
    async fn check(&self) -> Result<ReleaseCheck, ReleaseError> {
        let release = self.fetch_latest_release().await?;
        let latest = ReleaseVersion::parse(&release.tag_name)
            .ok_or_else(|| ReleaseError::InvalidTag(release.tag_name.clone()))?;
        let has_update = latest.is_newer_than(&self.current_version);
        let asset = select_asset(&release.assets, std::env::consts::OS, std::env::consts::ARCH)
            .map(ReleaseAsset::from);

        tracing::info!(
            "[Release] {}/{} latest {} (current {}, update: {})",
            self.owner, self.repo, latest, self.current_version, has_update
        );
        if has_update && asset.is_none() {
            tracing::warn!("[Release] {} has no asset for {}", release.tag_name, platform_label());
        }

        Ok(ReleaseCheck {
            current_version: self.current_version.to_string(),
            latest_version: latest.to_string(),
            tag: release.tag_name,
            has_update,
            notes: release.body,
            published_at: release.published_at,
            html_url: release.html_url,
            asset,
        })
    }

    async fn download_and_install(&self, release: &ReleaseCheck) -> Result<PathBuf, ReleaseError> {
        let asset = release.asset.as_ref().ok_or_else(|| ReleaseError::NoAsset {
            tag: release.tag.clone(),
            platform: platform_label(),
        })?;

        tracing::info!("[Release] Downloading {} ({} bytes)", asset.name, asset.size);
        let response = self.http.get(&asset.download_url).send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ReleaseError::Api { status, body });
        }
        let bytes = response.bytes().await?;

        // 에셋 이름에 경로가 섞여 있어도 스테이징 디렉터리 밖으로 나가지 않게
        let file_name = Path::new(&asset.name)
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "update.bin".into());
        let dir = self.staging_dir.join(&release.tag);
        tokio::fs::create_dir_all(&dir).await?;
        let dest = dir.join(file_name);
        tokio::fs::write(&dest, &bytes).await?;

        tracing::info!("[Release] Staged {} → {}", asset.name, dest.display());
        Ok(dest)
    }
}

fn platform_label() -> String {
    format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH)
}

fn os_keywords(os: &str) -> &'static [&'static str] {
    match os {
        "windows" => &["windows", "win64", "win32", ".msi", ".exe"],
        "macos" => &["macos", "darwin", "osx", ".dmg"],
        "linux" => &["linux", ".appimage", ".deb", ".rpm"],
        _ => &[],
    }
}

fn arch_keywords(arch: &str) -> &'static [&'static str] {
    match arch {
        "x86_64" => &["x86_64", "x64", "amd64"],
        "aarch64" => &["aarch64", "arm64"],
        "x86" => &["i686", "x86.", "win32"],
        _ => &[],
    }
}

/// 플랫폼 에셋 선택. OS가 맞는 것 중 아키텍처까지 맞는 것을 우선
pub fn select_asset<'a>(assets: &'a [GitHubAsset], os: &str, arch: &str) -> Option<&'a GitHubAsset> {
    let matches = |name: &str, keywords: &[&str]| keywords.iter().any(|k| name.contains(k));

    let candidates: Vec<&GitHubAsset> = assets
        .iter()
        .filter(|a| {
            let name = a.name.to_lowercase();
            !name.ends_with(".sig")
                && !name.ends_with(".sha256")
                && !name.ends_with(".json")
                && matches(&name, os_keywords(os))
        })
        .collect();

    candidates
        .iter()
        .find(|a| matches(&a.name.to_lowercase(), arch_keywords(arch)))
        .or_else(|| candidates.first())
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(name: &str) -> GitHubAsset {
        GitHubAsset {
            name: name.to_string(),
            size: 1,
            browser_download_url: format!("https://example.com/{name}"),
        }
    }

    fn release_assets() -> Vec<GitHubAsset> {
        vec![
            asset("latest.json"),
            asset("showcase_2.3.1_x64-setup.exe.sig"),
            asset("showcase_2.3.1_x64-setup.exe"),
            asset("showcase_2.3.1_aarch64.dmg"),
            asset("showcase_2.3.1_x64.dmg"),
            asset("showcase_2.3.1_amd64.AppImage"),
        ]
    }

    #[test]
    fn picks_os_and_arch_match() {
        let assets = release_assets();
        assert_eq!(
            select_asset(&assets, "macos", "aarch64").unwrap().name,
            "showcase_2.3.1_aarch64.dmg"
        );
        assert_eq!(
            select_asset(&assets, "macos", "x86_64").unwrap().name,
            "showcase_2.3.1_x64.dmg"
        );
        assert_eq!(
            select_asset(&assets, "linux", "x86_64").unwrap().name,
            "showcase_2.3.1_amd64.AppImage"
        );
    }

    #[test]
    fn signatures_and_manifests_are_never_picked() {
        let assets = release_assets();
        assert_eq!(
            select_asset(&assets, "windows", "x86_64").unwrap().name,
            "showcase_2.3.1_x64-setup.exe"
        );
    }

    #[test]
    fn falls_back_to_any_arch_for_the_os() {
        let assets = vec![asset("showcase-linux.tar.gz.sig"), asset("showcase.deb")];
        assert_eq!(select_asset(&assets, "linux", "aarch64").unwrap().name, "showcase.deb");
        assert!(select_asset(&assets, "freebsd", "x86_64").is_none());
    }

    #[test]
    fn invalid_current_version_is_rejected() {
        let cfg = ReleaseConfig {
            github_owner: "acme".into(),
            github_repo: "showcase".into(),
            ..Default::default()
        };
        assert!(matches!(
            GitHubReleaseSource::new(&cfg, "dev-build"),
            Err(ReleaseError::InvalidTag(_))
        ));
    }

    #[test]
    fn parses_release_payload_with_missing_optional_fields() {
        let json = r#"{
            "tag_name": "v2.3.1",
            "body": "- bug fixes",
            "assets": [{ "name": "showcase.dmg", "browser_download_url": "https://example.com/a" }]
        }"#;
        let release: GitHubRelease = serde_json::from_str(json).unwrap();
        assert!(!release.draft);
        assert!(!release.prerelease);
        assert_eq!(release.assets[0].size, 0);
        assert_eq!(release.html_url, None);
    }
}
