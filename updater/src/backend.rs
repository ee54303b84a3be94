//! 네이티브 백엔드 연결부
//!
//! 컨트롤러는 세 가지 원격 작업만 사용합니다. 모두 비동기 요청/응답이며
//! 성공 시 자유 형식 문자열을 돌려줍니다.

use async_trait::async_trait;
use std::sync::Arc;

use crate::BackendError;

#[async_trait]
pub trait UpdateBackend: Send + Sync + 'static {
    /// `check-for-updates`
    async fn check_for_updates(&self) -> Result<String, BackendError>;

    /// `download-and-install-update` — 다운로드부터 설치까지 한 번의 요청으로 처리
    async fn download_and_install_update(&self) -> Result<String, BackendError>;

    /// `restart-app` — 실패해도 워크플로는 계속됨
    async fn restart_app(&self) -> Result<(), BackendError>;
}

#[async_trait]
impl<T: UpdateBackend + ?Sized> UpdateBackend for Arc<T> {
    async fn check_for_updates(&self) -> Result<String, BackendError> {
        (**self).check_for_updates().await
    }

    async fn download_and_install_update(&self) -> Result<String, BackendError> {
        (**self).download_and_install_update().await
    }

    async fn restart_app(&self) -> Result<(), BackendError> {
        (**self).restart_app().await
    }
}
