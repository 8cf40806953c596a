//! 画像ファイルの読込

use apiary_forms_common::{Error, ImageDecoder, Result};
use gloo::file::callbacks::{read_as_data_url, FileReader};
use web_sys::File;

/// ローカル画像を data URL に変換する
///
/// 返す `FileReader` を破棄すると読込は中止され、コールバックは呼ばれない。
#[derive(Clone, Copy, Default)]
pub struct DataUrlDecoder;

impl ImageDecoder for DataUrlDecoder {
    type File = File;
    type Pending = Option<FileReader>;

    fn decode(&self, file: File, done: Box<dyn FnOnce(Result<String>)>) -> Option<FileReader> {
        let file = gloo::file::File::from(file);
        let name = file.name();

        // MIMEが分かっていて画像でなければ読まない
        let mime = file.raw_mime_type();
        if !mime.is_empty() && !mime.starts_with("image/") {
            done(Err(Error::DecodeFailure(format!("{} ({})", name, mime))));
            return None;
        }

        let reader = read_as_data_url(&file, move |result| {
            done(result.map_err(|e| Error::DecodeFailure(format!("{}: {}", name, e))));
        });
        Some(reader)
    }
}
