// Multipart upload endpoint
//
// The `file` part is streamed straight into the uploads directory. The text
// fields may arrive before or after it, so validation runs once the whole
// form has been read and a rejected upload removes its binary again.

use futures_util::future;
use futures_util::TryStreamExt;
use http_body_util::{BodyStream, Full};
use hyper::body::{Body, Bytes};
use hyper::Response;
use multer::{Constraints, Multipart, SizeLimit};

use super::response::success_message;
use super::BoxError;
use crate::config::AppState;
use crate::error::PortalError;
use crate::files::{Audience, FileRegistry, StoredBinary};
use crate::logger;
use crate::store::DocumentStore;

/// Fields of the upload form as they arrived
#[derive(Default)]
struct RawForm {
    binary: Option<StoredBinary>,
    audience: Option<String>,
    admission_no: Option<String>,
}

impl RawForm {
    async fn discard(self) {
        if let Some(binary) = self.binary {
            binary.discard().await;
        }
    }
}

/// A validated upload whose binary is already on disk
pub struct UploadForm {
    pub binary: StoredBinary,
    pub audience: Audience,
    pub admission_no: Option<String>,
}

/// POST /api/upload
pub async fn upload<B>(
    content_type: Option<&str>,
    body: B,
    state: &AppState,
) -> Result<Response<Full<Bytes>>, PortalError>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError> + Send + 'static,
{
    let form = receive_upload(content_type, body, &state.files, state.config.http.max_body_size)
        .await?;

    if let Err(e) = state
        .files
        .record(&form.binary, form.audience, form.admission_no)
        .await
    {
        form.binary.discard().await;
        return Err(e);
    }
    logger::log_info(&format!(
        "Stored upload '{}' as {} ({} bytes)",
        form.binary.original_name, form.binary.stored_name, form.binary.size
    ));
    Ok(success_message("File uploaded successfully!"))
}

/// Read a `multipart/form-data` body into a validated form
pub async fn receive_upload<B, S>(
    content_type: Option<&str>,
    body: B,
    registry: &FileRegistry<S>,
    max_size: u64,
) -> Result<UploadForm, PortalError>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError> + Send + 'static,
    S: DocumentStore,
{
    let boundary = content_type
        .and_then(|ct| multer::parse_boundary(ct).ok())
        .ok_or_else(|| PortalError::validation("Expected a multipart/form-data body"))?;

    let stream = BodyStream::new(body)
        .try_filter_map(|frame| future::ready(Ok(frame.into_data().ok())));
    let constraints = Constraints::new().size_limit(SizeLimit::new().whole_stream(max_size));
    let mut multipart = Multipart::with_constraints(stream, boundary, constraints);

    let mut form = RawForm::default();
    if let Err(e) = read_fields(&mut multipart, registry, &mut form).await {
        form.discard().await;
        return Err(e);
    }

    let Some(binary) = form.binary.take() else {
        return Err(PortalError::validation("No file uploaded"));
    };

    let audience = match form.audience.as_deref().unwrap_or_default().parse::<Audience>() {
        Ok(audience) => audience,
        Err(message) => {
            binary.discard().await;
            return Err(PortalError::validation(message));
        }
    };

    let admission_no = match audience {
        Audience::Public => None,
        Audience::Private => match form.admission_no.filter(|no| !no.trim().is_empty()) {
            Some(no) => Some(no),
            None => {
                binary.discard().await;
                return Err(PortalError::validation(
                    "admissionNo is required for private files",
                ));
            }
        },
    };

    Ok(UploadForm {
        binary,
        audience,
        admission_no,
    })
}

async fn read_fields<S: DocumentStore>(
    multipart: &mut Multipart<'_>,
    registry: &FileRegistry<S>,
    form: &mut RawForm,
) -> Result<(), PortalError> {
    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            // Only the first file part is kept
            Some("file") if form.binary.is_none() => {
                let raw_name = field.file_name().unwrap_or_default().to_string();
                let mut staged = registry.stage(&raw_name).await?;
                loop {
                    let chunk = match field.chunk().await {
                        Ok(Some(chunk)) => chunk,
                        Ok(None) => break,
                        Err(e) => {
                            staged.discard().await;
                            return Err(multipart_error(e));
                        }
                    };
                    if let Err(e) = staged.write_chunk(&chunk).await {
                        staged.discard().await;
                        return Err(e.into());
                    }
                }
                form.binary = Some(staged.finish().await?);
            }
            Some("audience") => {
                form.audience = Some(field.text().await.map_err(multipart_error)?);
            }
            Some("admissionNo") => {
                form.admission_no = Some(field.text().await.map_err(multipart_error)?);
            }
            _ => {}
        }
    }
    Ok(())
}

fn multipart_error(error: multer::Error) -> PortalError {
    match error {
        multer::Error::StreamSizeExceeded { limit } => PortalError::PayloadTooLarge(limit),
        other => PortalError::validation(format!("Malformed multipart body: {other}")),
    }
}
