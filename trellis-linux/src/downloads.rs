use std::cell::Cell;
use std::rc::{Rc, Weak};

use gtk4::glib;
use webkit6::prelude::*;

use trellis_core::download::{self, DownloadId, DownloadState};
use trellis_core::host::HostEvent;

use crate::runtime::Runtime;

/// Report one transfer's lifecycle as host events.
///
/// The destination is chosen without prompting, and `WillDownload` is sent
/// only then because WebKit knows the response length by that point.
pub fn track(download: &webkit6::Download, id: DownloadId, runtime: Weak<Runtime>) {
    let outcome: Rc<Cell<Option<DownloadState>>> = Rc::new(Cell::new(None));

    {
        let runtime = runtime.clone();
        download.connect_decide_destination(move |download, suggested| {
            let destination = download::unique_destination(&download::downloads_dir(), suggested);
            log::info!("Saving download {:?} to {:?}", id, destination);
            download.set_destination(&destination.to_string_lossy());

            let total_bytes = download
                .response()
                .map(|response| response.content_length())
                .unwrap_or(0);
            emit(&runtime, HostEvent::WillDownload { id, total_bytes });
            true
        });
    }

    {
        let runtime = runtime.clone();
        download.connect_received_data(move |download, _length| {
            emit(
                &runtime,
                HostEvent::DownloadUpdated {
                    id,
                    received_bytes: download.received_data_length(),
                },
            );
        });
    }

    {
        let outcome = outcome.clone();
        download.connect_failed(move |_, error| {
            outcome.set(Some(failure_state(error)));
        });
    }

    // `finished` also follows `failed`.
    download.connect_finished(move |_| {
        let state = outcome.get().unwrap_or(DownloadState::Completed);
        emit(&runtime, HostEvent::DownloadDone { id, state });
    });
}

fn failure_state(error: &glib::Error) -> DownloadState {
    if error.matches(webkit6::DownloadError::CancelledByUser) {
        DownloadState::Cancelled
    } else {
        log::warn!("Download failed: {}", error);
        DownloadState::Interrupted
    }
}

fn emit(runtime: &Weak<Runtime>, event: HostEvent) {
    if let Some(rt) = runtime.upgrade() {
        rt.dispatch(event);
    }
}
