//! HTML status document served on a bare `GET /`.
//!
//! Shows every joint with its current mode plus the indicator state.  The
//! hold-to-move buttons send `/?<id>_<dir>=1` on press and `=0` on release,
//! which is the same protocol any other client uses.  Leaving the page
//! sends `=0` for every button so no joint is left moving.

use core::fmt::Write;

use crate::app::commands::Button;
use crate::app::state::{JointId, StateSnapshot};

const HEAD: &str = r#"<!DOCTYPE html>
<html><head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width,initial-scale=1">
<title>eArm</title>
<style>
body{font-family:Arial,sans-serif;background:#1a1a2e;color:#222;display:flex;justify-content:center;padding:20px}
.panel{background:#fff;border-radius:16px;padding:20px;max-width:420px;width:100%}
.joint{display:flex;align-items:center;justify-content:space-between;background:#f8f9fa;border-radius:12px;padding:12px;margin:10px 0}
.label{text-align:center;flex:1}
.mode{font-size:12px;color:#666}
.btn{width:64px;height:64px;border:none;border-radius:12px;font-size:28px;user-select:none;touch-action:manipulation}
.buzzer{width:100%;padding:16px;border:none;border-radius:12px;font-size:18px;color:#fff}
.on{background:#e74c3c}.off{background:#3498db}
</style>
</head><body><div class="panel">
<h2>eArm</h2>
"#;

const TAIL: &str = r#"<script>
function f(j,d,s){fetch('/?'+j+'_'+d+'='+s,{cache:'no-cache'}).catch(()=>{})}
function t(){var b=document.getElementById('buzzer');var on=b.dataset.on!=='1';
b.dataset.on=on?'1':'0';b.className='buzzer '+(on?'on':'off');
b.textContent='Buzzer: '+(on?'on':'off');fetch('/?buzzer='+(on?'on':'off'),{cache:'no-cache'})}
function u(){fetch('/?status_check=1').catch(()=>{});setTimeout(u,10000)}
window.onbeforeunload=function(){['a','b','c','d'].forEach(function(j){['minus','plus'].forEach(function(d){
fetch('/?'+j+'_'+d+'=0',{cache:'no-cache',keepalive:true}).catch(()=>{})})})};
u();
</script>
</div></body></html>"#;

/// Render the page for `snapshot`.
pub fn render(snapshot: &StateSnapshot) -> String {
    let mut html = String::with_capacity(4096);
    html.push_str(HEAD);

    for joint in JointId::ALL {
        let _ = write!(
            html,
            "<div class=\"joint\" id=\"joint-{p}\">{minus}<div class=\"label\">\
             <b>{id}</b> {label}<div class=\"mode\">{mode}</div></div>{plus}</div>\n",
            p = joint.key_prefix(),
            id = joint,
            label = joint.label(),
            mode = snapshot.mode(joint).as_str(),
            minus = HoldButton(joint, Button::Minus),
            plus = HoldButton(joint, Button::Plus),
        );
    }

    let (class, flag, text) = if snapshot.indicator {
        ("on", "1", "on")
    } else {
        ("off", "0", "off")
    };
    let _ = write!(
        html,
        "<button class=\"buzzer {class}\" id=\"buzzer\" data-on=\"{flag}\" onclick=\"t()\">\
         Buzzer: {text}</button>\n"
    );

    html.push_str(TAIL);
    html
}

struct HoldButton(JointId, Button);

impl core::fmt::Display for HoldButton {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let j = self.0.key_prefix();
        let d = self.1.key_suffix();
        let glyph = match self.1 {
            Button::Minus => "&minus;",
            Button::Plus => "+",
        };
        write!(
            f,
            "<button class=\"btn\" id=\"{j}_{d}\" \
             onmousedown=\"f('{j}','{d}',1)\" onmouseup=\"f('{j}','{d}',0)\" \
             ontouchstart=\"f('{j}','{d}',1)\" ontouchend=\"f('{j}','{d}',0)\">{glyph}</button>"
        )
    }
}
