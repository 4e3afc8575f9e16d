//! Native share through the XDG desktop portal
//!
//! Uses `org.freedesktop.portal.OpenURI.OpenFile` with `ask = true`, which
//! lets the user pick the application that receives the image. The portal
//! answers asynchronously through a `Request` object's `Response` signal.

use std::collections::HashMap;
use std::os::fd::AsFd;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::Context;
use futures::StreamExt;
use zbus::zvariant;

use super::{ShareError, ShareRequest, ShareTarget};
use crate::export::EncodedImage;

/// Portal response status codes
pub const PORTAL_RESPONSE_SUCCESS: u32 = 0;
pub const PORTAL_RESPONSE_CANCELLED: u32 = 1;
pub const PORTAL_RESPONSE_OTHER: u32 = 2;

/// OpenURI needs version 3 for the `ask` option
const MIN_OPEN_URI_VERSION: u32 = 3;

/// How long the staged file outlives the portal's answer
pub const RELEASE_DELAY: Duration = Duration::from_secs(1);

#[zbus::proxy(
    interface = "org.freedesktop.portal.OpenURI",
    default_service = "org.freedesktop.portal.Desktop",
    default_path = "/org/freedesktop/portal/desktop"
)]
trait OpenUri {
    fn open_file(
        &self,
        parent_window: &str,
        fd: zvariant::Fd<'_>,
        options: HashMap<&str, zvariant::Value<'_>>,
    ) -> zbus::Result<zvariant::OwnedObjectPath>;

    #[zbus(property, name = "version")]
    fn version(&self) -> zbus::Result<u32>;
}

#[zbus::proxy(
    interface = "org.freedesktop.portal.Request",
    default_service = "org.freedesktop.portal.Desktop"
)]
trait Request {
    #[zbus(signal)]
    fn response(
        &self,
        response: u32,
        results: HashMap<String, zvariant::OwnedValue>,
    ) -> zbus::Result<()>;
}

/// Map a portal response code onto the share result
pub fn share_result(code: u32) -> Result<(), ShareError> {
    match code {
        PORTAL_RESPONSE_SUCCESS => Ok(()),
        PORTAL_RESPONSE_CANCELLED => Err(ShareError::Cancelled),
        PORTAL_RESPONSE_OTHER => Err(ShareError::Failed(anyhow::anyhow!(
            "portal request ended without sharing"
        ))),
        other => Err(ShareError::Failed(anyhow::anyhow!(
            "portal returned response code {}",
            other
        ))),
    }
}

/// Request object path the portal will use for `token`
fn request_path(unique_name: &str, token: &str) -> String {
    let sender = unique_name.trim_start_matches(':').replace('.', "_");
    format!("/org/freedesktop/portal/desktop/request/{sender}/{token}")
}

fn handle_token() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or_default();
    format!("planmark_{}_{}", std::process::id(), nanos)
}

async fn first_response(responses: &mut ResponseStream) -> anyhow::Result<u32> {
    let response = responses
        .next()
        .await
        .context("Portal closed the request without answering")?;
    Ok(*response.args()?.response())
}

/// Share target backed by the desktop portal on the session bus
#[derive(Clone, Debug)]
pub struct PortalShare {
    connection: zbus::Connection,
}

impl PortalShare {
    /// Runtime capability probe; `None` means native share is unavailable
    pub async fn probe() -> Option<Self> {
        let connection = match zbus::Connection::session().await {
            Ok(connection) => connection,
            Err(err) => {
                log::info!("No session bus, native share unavailable: {}", err);
                return None;
            }
        };
        let proxy = match OpenUriProxy::new(&connection).await {
            Ok(proxy) => proxy,
            Err(err) => {
                log::info!("OpenURI portal unavailable: {}", err);
                return None;
            }
        };
        match proxy.version().await {
            Ok(version) if version >= MIN_OPEN_URI_VERSION => {
                log::debug!("OpenURI portal version {}", version);
                Some(Self { connection })
            }
            Ok(version) => {
                log::info!("OpenURI portal version {} too old for sharing", version);
                None
            }
            Err(err) => {
                log::info!("OpenURI portal unavailable: {}", err);
                None
            }
        }
    }

    async fn open_file(&self, image: &EncodedImage, request: &ShareRequest) -> anyhow::Result<u32> {
        // Stage under the date-stamped name so the receiver sees it
        let dir = tempfile::Builder::new()
            .prefix("planmark-")
            .tempdir()
            .context("Failed to create staging directory")?;
        let path = dir.path().join(&request.file_name);
        std::fs::write(&path, &image.bytes).context("Failed to stage image")?;
        let file = std::fs::File::open(&path).context("Failed to open staged image")?;

        let token = handle_token();
        let unique_name = self
            .connection
            .unique_name()
            .context("Session bus connection has no unique name")?
            .to_string();
        let expected = request_path(&unique_name, &token);

        // Subscribe before calling so the response cannot be missed
        let request_proxy = RequestProxy::builder(&self.connection)
            .path(expected.clone())?
            .build()
            .await?;
        let mut responses = request_proxy.receive_response().await?;

        let open_uri = OpenUriProxy::new(&self.connection).await?;
        let mut options: HashMap<&str, zvariant::Value<'_>> = HashMap::new();
        options.insert("handle_token", token.as_str().into());
        options.insert("ask", true.into());
        options.insert("writable", false.into());

        log::debug!(
            "Sharing {} ({}, {})",
            request.file_name,
            EncodedImage::MIME_TYPE,
            request.title
        );
        let handle = open_uri
            .open_file("", file.as_fd().into(), options)
            .await
            .context("OpenFile call failed")?;

        let code = if handle.as_str() == expected {
            first_response(&mut responses).await?
        } else {
            // Older portals ignore handle_token
            log::debug!("Portal used request path {}", handle.as_str());
            let late_proxy = RequestProxy::builder(&self.connection)
                .path(handle.as_str().to_string())?
                .build()
                .await?;
            let mut late = late_proxy.receive_response().await?;
            first_response(&mut late).await?
        };

        // Give the receiving application time to open the file
        tokio::time::sleep(RELEASE_DELAY).await;
        drop(file);
        drop(dir);

        Ok(code)
    }
}

impl ShareTarget for PortalShare {
    async fn share(&self, image: &EncodedImage, request: &ShareRequest) -> Result<(), ShareError> {
        match self.open_file(image, request).await {
            Ok(code) => share_result(code),
            Err(err) => Err(ShareError::Failed(err)),
        }
    }
}
