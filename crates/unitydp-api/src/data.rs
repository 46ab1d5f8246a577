// Point reader / writer
//
// Reads batch any number of points into one GET; writes go out one
// POST per point inside the `begin`/`end` envelope. The card has not
// been confirmed to accept batched writes, so the per-point POST is
// deliberate.

use std::collections::HashMap;

use tracing::debug;

use crate::client::{HTTP_GET_PATH, HTTP_SET_PATH, UnityClient};
use crate::error::Error;
use crate::wire::{self, SetValue};

impl UnityClient {
    /// Read a batch of points in a single call.
    ///
    /// `GET /httpGetSet/httpGet.htm?devId={dev_id}&vNNNN=vel~pnt~NNNN&…`
    ///
    /// Returns a map of point identifier → unquoted string value,
    /// containing whatever the card chose to answer (plus bookkeeping
    /// keys like `sessACT`). Points the card skipped are simply absent.
    pub async fn get_data(
        &self,
        points: &[&str],
        dev_id: u32,
    ) -> Result<HashMap<String, String>, Error> {
        let mut params = Vec::with_capacity(points.len() + 1);
        params.push(("devId".to_owned(), dev_id.to_string()));
        for point in points {
            params.push(((*point).to_owned(), wire::point_query(point)));
        }

        let body = self.request_get(HTTP_GET_PATH, &params).await?;
        Ok(wire::parse_fields(&body))
    }

    /// Write points, one POST per point, stopping at the first failure.
    ///
    /// `POST /protected/httpSet.htm` with the `begin`/`end` envelope
    /// and one encoded field per request. Points already written before
    /// a failure are not rolled back; the error names the failed point.
    pub async fn set_data(
        &self,
        writes: &[(&str, SetValue)],
        dev_id: u32,
    ) -> Result<(), Error> {
        for (point, value) in writes {
            let (field, encoded) = wire::encode_set_field(point, value);
            debug!(point, field = field.as_str(), "writing point");

            let form = vec![
                ("devId".to_owned(), dev_id.to_string()),
                ("begin".to_owned(), wire::SET_BEGIN.to_owned()),
                (field, encoded),
                ("end".to_owned(), wire::SET_END.to_owned()),
            ];

            self.request_post(HTTP_SET_PATH, &form)
                .await
                .map_err(|e| Error::Write {
                    point: (*point).to_owned(),
                    source: Box::new(e),
                })?;
        }
        Ok(())
    }
}
