//! Selection and clipboard exchange with other clients.
//!
//! Only the primary selection and the plain-text target are served. Every
//! conversion request is answered, naming `NONE` as the property when it
//! could not be satisfied.

use tracing::{debug, warn};

use crate::connection::{DisplayConnection, SelectionReply};
use crate::event::{
    Atom, Hwnd, SelectionClearEvent, SelectionNotifyEvent, SelectionRequestEvent,
};
use crate::host::Host;
use crate::Core;

impl<C: DisplayConnection, H: Host> Core<C, H> {
    pub(crate) fn on_selection_request(&mut self, hwnd: Hwnd, event: SelectionRequestEvent) {
        let property = if event.target == Atom::STRING {
            self.serve_text(hwnd, &event)
        } else {
            Atom::NONE
        };
        if property.is_none() {
            debug!("Request for target {:?} ignored", event.target);
        }

        let reply = SelectionReply {
            requestor: event.requestor,
            selection: event.selection,
            target: event.target,
            property,
            time: event.time,
        };
        if let Err(e) = self.connection.send_selection_notify(reply) {
            warn!("Failed to answer selection request: {}", e);
        }
    }

    /// Write the clipboard text for a plain-text request. Returns the
    /// property used, or `NONE`.
    fn serve_text(&mut self, hwnd: Hwnd, event: &SelectionRequestEvent) -> Atom {
        if event.selection != Atom::PRIMARY || !self.host.has_text() {
            return Atom::NONE;
        }
        let property = if event.property.is_none() {
            event.target
        } else {
            event.property
        };

        // best effort: read and write even when open fails
        let opened = self.host.open(Some(hwnd));
        let text = self.host.text().unwrap_or_default();
        let result = self
            .connection
            .change_property_text(event.requestor, property, &text);
        if opened {
            self.host.close();
        }

        match result {
            Ok(()) => property,
            Err(e) => {
                warn!("Failed to store selection text: {}", e);
                Atom::NONE
            },
        }
    }

    pub(crate) fn on_selection_notify(&mut self, event: SelectionNotifyEvent) {
        if event.selection != Atom::PRIMARY {
            return;
        }
        if event.target != Atom::STRING {
            self.host.ingest_selection(None);
        }

        let text = if event.property.is_none() {
            None
        } else {
            self.connection
                .read_property_text(event.requestor, event.property)
                .unwrap_or_else(|e| {
                    warn!("Failed to read selection property: {}", e);
                    None
                })
        };
        self.host.ingest_selection(text);
    }

    pub(crate) fn on_selection_clear(&mut self, hwnd: Hwnd, event: SelectionClearEvent) {
        if event.selection != Atom::PRIMARY {
            return;
        }
        self.host.release_selection(hwnd);
    }
}
