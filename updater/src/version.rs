//! 릴리스 태그 버전 비교
//!
//! GitHub 태그(`v1.2.3`, `1.2`, `2.0.0-beta.2+build.7`)를 파싱해
//! 실행 중인 버전보다 새로운지 판단합니다. 빌드 메타데이터는 비교에서 제외합니다.

use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    /// 점으로 나뉜 프리릴리스 식별자 (`beta.2` → `["beta", "2"]`)
    pub prerelease: Vec<String>,
}

impl ReleaseVersion {
    /// 태그 파싱. 앞의 `v`/`V`와 뒤의 `+빌드메타`는 무시합니다.
    pub fn parse(tag: &str) -> Option<Self> {
        let s = tag.trim();
        let s = s.strip_prefix(['v', 'V']).unwrap_or(s);
        let s = s.split_once('+').map_or(s, |(core, _build)| core);

        let (core, pre) = match s.split_once('-') {
            Some((core, pre)) if !pre.is_empty() => (core, Some(pre)),
            Some(_) => return None,
            None => (s, None),
        };

        let mut numbers = core.split('.').map(|p| p.parse::<u64>().ok());
        let major = numbers.next()??;
        let minor = numbers.next().unwrap_or(Some(0))?;
        let patch = numbers.next().unwrap_or(Some(0))?;
        if numbers.next().is_some() {
            return None;
        }

        let prerelease = pre
            .map(|p| p.split('.').map(str::to_string).collect())
            .unwrap_or_default();

        Some(Self { major, minor, patch, prerelease })
    }

    pub fn is_prerelease(&self) -> bool {
        !self.prerelease.is_empty()
    }

    pub fn is_newer_than(&self, current: &ReleaseVersion) -> bool {
        self > current
    }
}

fn compare_identifiers(a: &[String], b: &[String]) -> Ordering {
    // 정식 릴리스 > 프리릴리스
    match (a.is_empty(), b.is_empty()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }

    for (x, y) in a.iter().zip(b.iter()) {
        let ord = match (x.parse::<u64>(), y.parse::<u64>()) {
            (Ok(nx), Ok(ny)) => nx.cmp(&ny),
            (Ok(_), Err(_)) => Ordering::Less,
            (Err(_), Ok(_)) => Ordering::Greater,
            (Err(_), Err(_)) => x.cmp(y),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

impl Ord for ReleaseVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| compare_identifiers(&self.prerelease, &other.prerelease))
    }
}

impl PartialOrd for ReleaseVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if self.is_prerelease() {
            write!(f, "-{}", self.prerelease.join("."))?;
        }
        Ok(())
    }
}
