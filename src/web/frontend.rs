//! Embedded HTML/CSS/JS frontend for the autoserv web dashboard.
//!
//! The entire SPA is compiled into the binary as a string constant.
//! No external assets, no build tools, no CDN dependencies.

/// The complete single-page dashboard HTML.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>autoserv Dashboard</title>
<style>
:root {
  --bg: #0d1117;
  --surface: #161b22;
  --border: #30363d;
  --text: #e6edf3;
  --text-muted: #8b949e;
  --accent: #58a6ff;
  --green: #3fb950;
  --yellow: #d29922;
  --red: #f85149;
  --purple: #bc8cff;
  --radius: 8px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
  --mono: 'SF Mono', 'Cascadia Code', 'Fira Code', monospace;
}

* { margin: 0; padding: 0; box-sizing: border-box; }
body {
  background: var(--bg);
  color: var(--text);
  font-family: var(--font);
  font-size: 14px;
  line-height: 1.5;
}

.app { max-width: 1200px; margin: 0 auto; padding: 24px; }

header {
  display: flex;
  align-items: center;
  justify-content: space-between;
  margin-bottom: 24px;
  padding-bottom: 16px;
  border-bottom: 1px solid var(--border);
}
header h1 { font-size: 22px; font-weight: 600; }
header .subtitle { color: var(--text-muted); font-size: 13px; }

.badge {
  display: inline-flex;
  align-items: center;
  gap: 4px;
  padding: 4px 10px;
  border-radius: 12px;
  font-size: 12px;
  background: var(--surface);
  border: 1px solid var(--border);
}
.badge.ok { border-color: var(--green); color: var(--green); }
.badge.warn { border-color: var(--yellow); color: var(--yellow); }
.badge.err { border-color: var(--red); color: var(--red); }

nav {
  display: flex;
  gap: 4px;
  margin-bottom: 24px;
  background: var(--surface);
  border-radius: var(--radius);
  padding: 4px;
  border: 1px solid var(--border);
}
nav button {
  flex: 1;
  padding: 8px 16px;
  border: none;
  border-radius: 6px;
  background: transparent;
  color: var(--text-muted);
  font-size: 13px;
  font-weight: 500;
  cursor: pointer;
}
nav button:hover { color: var(--text); background: rgba(255,255,255,0.04); }
nav button.active { background: var(--accent); color: #fff; }

.panel { display: none; }
.panel.active { display: block; }

.card {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 20px;
  margin-bottom: 16px;
}
.card h2 { font-size: 16px; font-weight: 600; margin-bottom: 16px; }

.stats-grid {
  display: grid;
  grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
  gap: 16px;
  margin-bottom: 24px;
}
.stat-card {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 20px;
  text-align: center;
}
.stat-card .value {
  font-size: 26px;
  font-weight: 700;
  font-family: var(--mono);
  color: var(--accent);
}
.stat-card .value.green { color: var(--green); }
.stat-card .value.purple { color: var(--purple); }
.stat-card .label {
  font-size: 12px;
  color: var(--text-muted);
  margin-top: 6px;
  text-transform: uppercase;
  letter-spacing: 0.5px;
}

table { width: 100%; border-collapse: collapse; font-size: 13px; }
th, td { text-align: left; padding: 8px 12px; border-bottom: 1px solid var(--border); }
th {
  color: var(--text-muted);
  font-weight: 500;
  font-size: 12px;
  text-transform: uppercase;
}
td.num, th.num { text-align: right; font-family: var(--mono); }
tr.total td { font-weight: 700; border-top: 2px solid var(--border); }
tr:hover { background: rgba(255,255,255,0.02); }

.chart {
  display: flex;
  align-items: flex-end;
  gap: 6px;
  height: 180px;
  padding-top: 20px;
}
.chart .bar-group {
  flex: 1;
  display: flex;
  flex-direction: column;
  align-items: center;
  height: 100%;
  justify-content: flex-end;
}
.chart .stack { width: 100%; max-width: 36px; display: flex; flex-direction: column; }
.chart .seg.service { background: var(--accent); }
.chart .seg.spare { background: var(--purple); border-radius: 3px 3px 0 0; }
.chart .bar-label { font-size: 10px; color: var(--text-muted); margin-top: 6px; }

.legend { display: flex; gap: 16px; font-size: 12px; color: var(--text-muted); margin-top: 8px; }
.legend span::before {
  content: '';
  display: inline-block;
  width: 10px;
  height: 10px;
  border-radius: 3px;
  margin-right: 4px;
  vertical-align: middle;
}
.legend .service::before { background: var(--accent); }
.legend .spare::before { background: var(--purple); }

.toolbar { display: flex; gap: 8px; align-items: center; margin-bottom: 16px; }
input, select {
  background: var(--bg);
  border: 1px solid var(--border);
  border-radius: 6px;
  color: var(--text);
  padding: 6px 10px;
  font-size: 13px;
}
.btn {
  padding: 7px 14px;
  border-radius: 6px;
  border: 1px solid var(--border);
  background: var(--surface);
  color: var(--text);
  cursor: pointer;
  font-size: 13px;
}
.btn.primary { background: var(--accent); border-color: var(--accent); color: #fff; }

.items-row { display: flex; gap: 8px; margin-bottom: 8px; }
.items-row input.name { flex: 1; }
.items-row input.cost { width: 120px; }
.field-errors { color: var(--red); font-size: 12px; margin-top: 8px; }

.empty { color: var(--text-muted); text-align: center; padding: 24px; }
.visit { border-bottom: 1px solid var(--border); padding: 12px 0; }
.visit .head { display: flex; justify-content: space-between; font-weight: 600; }
.visit .lines { color: var(--text-muted); font-size: 12px; margin-top: 4px; }

.toast {
  position: fixed;
  bottom: 24px;
  right: 24px;
  background: var(--green);
  color: #fff;
  padding: 10px 16px;
  border-radius: 6px;
  opacity: 0;
  transition: opacity 0.2s;
}
.toast.show { opacity: 1; }
.toast.error { background: var(--red); }
</style>
</head>
<body>
<div class="app">

  <header>
    <div>
      <h1 id="shop-name">autoserv</h1>
      <div class="subtitle" id="fetched-at">Service records dashboard</div>
    </div>
    <div>
      <span id="health-badges"></span>
      <button class="btn" id="btn-refresh">Refresh</button>
    </div>
  </header>

  <nav id="nav">
    <button class="active" data-panel="dashboard">Dashboard</button>
    <button data-panel="monthly">Monthly</button>
    <button data-panel="daily">Daily</button>
    <button data-panel="vehicles">Vehicles</button>
  </nav>

  <!-- Dashboard -->
  <div class="panel active" id="panel-dashboard">
    <div class="stats-grid">
      <div class="stat-card"><div class="value" id="stat-services">0</div><div class="label">Total Services</div></div>
      <div class="stat-card"><div class="value green" id="stat-revenue">0</div><div class="label">Total Revenue</div></div>
      <div class="stat-card"><div class="value purple" id="stat-average">0</div><div class="label">Average Bill</div></div>
    </div>
    <div class="card">
      <h2>Monthly Revenue</h2>
      <div class="chart" id="revenue-chart"></div>
      <div class="legend"><span class="service">Service</span><span class="spare">Spare parts</span></div>
    </div>
    <div class="card">
      <h2>Most Replaced Parts</h2>
      <table>
        <thead><tr><th>#</th><th>Part</th><th class="num">Count</th></tr></thead>
        <tbody id="parts-tbody"></tbody>
      </table>
      <div class="empty" id="parts-empty" style="display:none">No spare parts recorded yet.</div>
    </div>
  </div>

  <!-- Monthly -->
  <div class="panel" id="panel-monthly">
    <div class="toolbar">
      <label for="year-select">Year</label>
      <select id="year-select"></select>
    </div>
    <div class="card">
      <h2 id="year-title">Revenue</h2>
      <div class="chart" id="year-chart"></div>
    </div>
    <div class="card">
      <table>
        <thead><tr><th>Month</th><th class="num">Service</th><th class="num">Spares</th><th class="num">Total</th></tr></thead>
        <tbody id="year-tbody"></tbody>
      </table>
    </div>
  </div>

  <!-- Daily -->
  <div class="panel" id="panel-daily">
    <div class="toolbar">
      <label for="day-input">Date</label>
      <input type="date" id="day-input">
    </div>
    <div class="stats-grid">
      <div class="stat-card"><div class="value" id="day-services">0</div><div class="label">Services</div></div>
      <div class="stat-card"><div class="value green" id="day-revenue">0</div><div class="label">Revenue</div></div>
      <div class="stat-card"><div class="value purple" id="day-average">0</div><div class="label">Average Bill</div></div>
    </div>
    <div class="card">
      <table>
        <thead><tr><th>Vehicle</th><th>Work</th><th class="num">Total</th></tr></thead>
        <tbody id="day-tbody"></tbody>
      </table>
      <div class="empty" id="day-empty" style="display:none">No services recorded on this day.</div>
    </div>
  </div>

  <!-- Vehicles -->
  <div class="panel" id="panel-vehicles">
    <div class="toolbar">
      <input id="vehicle-input" placeholder="Vehicle number" maxlength="20">
      <button class="btn primary" id="btn-lookup">Show history</button>
    </div>
    <div class="card">
      <h2 id="history-title">Service History</h2>
      <div id="history-list"><div class="empty">Enter a vehicle number.</div></div>
    </div>
    <div class="card">
      <h2>Add Service</h2>
      <div class="toolbar">
        <input type="date" id="entry-date">
        <input type="number" id="entry-km" placeholder="Kilometer reading" min="0">
      </div>
      <h3>Spare parts</h3>
      <div id="parts-rows"></div>
      <button class="btn" id="btn-add-part">+ Part</button>
      <h3 style="margin-top:12px">Service items</h3>
      <div id="service-rows"></div>
      <button class="btn" id="btn-add-service">+ Service</button>
      <div style="margin-top:16px"><button class="btn primary" id="btn-save">Save service</button></div>
      <div class="field-errors" id="entry-errors"></div>
    </div>
  </div>

</div>

<div class="toast" id="toast"></div>

<script>
// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------
let currency = '₹';
let currentVehicle = '';

// ---------------------------------------------------------------------------
// API helpers
// ---------------------------------------------------------------------------
async function api(method, path, body) {
  const opts = { method, headers: {} };
  if (body) {
    opts.headers['Content-Type'] = 'application/json';
    opts.body = JSON.stringify(body);
  }
  const res = await fetch(path, opts);
  const data = await res.json();
  if (res.status >= 500 || res.status === 403) throw new Error(data.error || res.statusText);
  return { status: res.status, data };
}

function toast(msg, isError) {
  const el = document.getElementById('toast');
  el.textContent = msg;
  el.className = 'toast show' + (isError ? ' error' : '');
  setTimeout(() => el.className = 'toast', 3000);
}

function money(n) {
  const v = Number.isFinite(n) ? n : 0;
  return currency + v.toLocaleString('en-IN', { minimumFractionDigits: 2, maximumFractionDigits: 2 });
}

function esc(s) {
  if (!s) return '';
  return String(s).replace(/&/g,'&amp;').replace(/</g,'&lt;').replace(/>/g,'&gt;').replace(/"/g,'&quot;');
}

function isoToday() {
  const d = new Date();
  const pad = n => String(n).padStart(2, '0');
  return `${d.getFullYear()}-${pad(d.getMonth() + 1)}-${pad(d.getDate())}`;
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------
document.getElementById('nav').addEventListener('click', e => {
  if (e.target.tagName !== 'BUTTON') return;
  const panel = e.target.dataset.panel;
  document.querySelectorAll('nav button').forEach(b => b.classList.remove('active'));
  e.target.classList.add('active');
  document.querySelectorAll('.panel').forEach(p => p.classList.remove('active'));
  document.getElementById('panel-' + panel).classList.add('active');
  loadPanel(panel);
});

async function loadPanel(panel) {
  switch (panel) {
    case 'dashboard': return loadDashboard();
    case 'monthly': return loadMonthly();
    case 'daily': return loadDaily();
  }
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------
function renderChart(el, rows) {
  const max = Math.max(1, ...rows.map(r => r.amount));
  el.innerHTML = rows.map(r => `
    <div class="bar-group" title="${esc(r.label)}: ${money(r.amount)}">
      <div class="stack">
        <div class="seg spare" style="height:${(r.spareCost / max) * 140}px"></div>
        <div class="seg service" style="height:${(r.serviceCost / max) * 140}px"></div>
      </div>
      <div class="bar-label">${esc(r.short)}</div>
    </div>`).join('');
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------
async function loadDashboard() {
  try {
    const [{ data: s }, { data: r }] = await Promise.all([
      api('GET', '/api/summary'),
      api('GET', '/api/revenue'),
    ]);
    document.getElementById('stat-services').textContent = s.summary.totalServices;
    document.getElementById('stat-revenue').textContent = money(s.summary.totalRevenue);
    document.getElementById('stat-average').textContent = money(s.summary.averageServiceCost);
    document.getElementById('fetched-at').textContent =
      'Data as of ' + new Date(s.fetchedAt).toLocaleString();

    const tbody = document.getElementById('parts-tbody');
    document.getElementById('parts-empty').style.display = s.topParts.length ? 'none' : 'block';
    tbody.innerHTML = s.topParts.map((p, i) =>
      `<tr><td>${i + 1}</td><td>${esc(p.name)}</td><td class="num">${p.count}</td></tr>`).join('');

    const recent = r.months.slice(0, 12).reverse();
    renderChart(document.getElementById('revenue-chart'), recent.map(m => ({
      label: m.monthYear, short: m.monthYear.slice(0, 3) + ' ' + String(m.year).slice(2),
      amount: m.amount, serviceCost: m.serviceCost, spareCost: m.spareCost,
    })));

    const select = document.getElementById('year-select');
    const years = s.years.length ? s.years : [new Date().getFullYear()];
    const selected = select.value;
    select.innerHTML = years.map(y => `<option value="${y}">${y}</option>`).join('');
    if (selected) select.value = selected;
  } catch (e) {
    toast('Failed to load summary: ' + e.message, true);
  }
}

// ---------------------------------------------------------------------------
// Monthly
// ---------------------------------------------------------------------------
async function loadMonthly() {
  const year = document.getElementById('year-select').value || new Date().getFullYear();
  try {
    const { data: v } = await api('GET', '/api/monthly?year=' + encodeURIComponent(year));
    document.getElementById('year-title').textContent = 'Revenue ' + v.year;
    renderChart(document.getElementById('year-chart'), v.months.map(m => ({
      label: m.name, short: m.shortName,
      amount: m.amount, serviceCost: m.serviceCost, spareCost: m.spareCost,
    })));
    document.getElementById('year-tbody').innerHTML = v.months.map(m => `
      <tr><td>${m.name}</td><td class="num">${money(m.serviceCost)}</td>
      <td class="num">${money(m.spareCost)}</td><td class="num">${money(m.amount)}</td></tr>`).join('') +
      `<tr class="total"><td>Total</td><td class="num">${money(v.total.serviceCost)}</td>
      <td class="num">${money(v.total.spareCost)}</td><td class="num">${money(v.total.amount)}</td></tr>`;
  } catch (e) {
    toast('Failed to load monthly revenue: ' + e.message, true);
  }
}

document.getElementById('year-select').addEventListener('change', loadMonthly);

// ---------------------------------------------------------------------------
// Daily
// ---------------------------------------------------------------------------
async function loadDaily() {
  const input = document.getElementById('day-input');
  if (!input.value) input.value = isoToday();
  try {
    const { data: d } = await api('GET', '/api/services?date=' + encodeURIComponent(input.value));
    document.getElementById('day-services').textContent = d.totalServices || 0;
    document.getElementById('day-revenue').textContent = money(d.totalRevenue);
    document.getElementById('day-average').textContent = money(d.averageServiceCost);
    const services = d.services || [];
    document.getElementById('day-empty').style.display = services.length ? 'none' : 'block';
    document.getElementById('day-tbody').innerHTML = services.map(s => {
      const work = (s.serviceItems || []).map(i => i.description)
        .concat((s.spareParts || []).map(p => p.name)).join(', ');
      return `<tr><td>${esc(s.vehicleNumber)}</td><td>${esc(work)}</td><td class="num">${money(s.totalCost)}</td></tr>`;
    }).join('');
  } catch (e) {
    toast('Failed to load services: ' + e.message, true);
  }
}

document.getElementById('day-input').addEventListener('change', loadDaily);

// ---------------------------------------------------------------------------
// Vehicles
// ---------------------------------------------------------------------------
async function loadHistory() {
  const number = document.getElementById('vehicle-input').value.trim().toUpperCase();
  if (!number) return;
  try {
    const { status, data } = await api('GET', '/api/vehicles/' + encodeURIComponent(number));
    const list = document.getElementById('history-list');
    if (status === 400) {
      list.innerHTML = `<div class="empty">${esc(data.errors[0].message)}</div>`;
      return;
    }
    currentVehicle = data.vehicleNumber;
    document.getElementById('history-title').textContent = 'Service History: ' + currentVehicle;
    if (!data.records.length) {
      list.innerHTML = '<div class="empty">No service records yet. Add the first one below.</div>';
      return;
    }
    list.innerHTML = data.records.map(r => {
      const lines = (r.spareParts || []).map(p => `${esc(p.name)} ${money(p.cost)}`)
        .concat((r.serviceItems || []).map(i => `${esc(i.description)} ${money(i.cost)}`));
      const km = r.kilometerReading != null ? ` · ${r.kilometerReading.toLocaleString()} km` : '';
      return `<div class="visit"><div class="head"><span>${esc(r.date.slice(0, 10))}${km}</span>
        <span>${money(r.totalCost)}</span></div><div class="lines">${lines.join(' · ')}</div></div>`;
    }).join('');
  } catch (e) {
    toast('Failed to load history: ' + e.message, true);
  }
}

function addRow(containerId, placeholder) {
  const row = document.createElement('div');
  row.className = 'items-row';
  row.innerHTML = `<input class="name" placeholder="${placeholder}">
    <input class="cost" type="number" min="0" step="0.01" placeholder="Cost">
    <button class="btn">✕</button>`;
  row.querySelector('button').addEventListener('click', () => row.remove());
  document.getElementById(containerId).appendChild(row);
}

function readRows(containerId, key) {
  return [...document.querySelectorAll('#' + containerId + ' .items-row')].map(row => ({
    [key]: row.querySelector('.name').value,
    cost: parseFloat(row.querySelector('.cost').value || '0'),
  }));
}

async function saveService() {
  const number = document.getElementById('vehicle-input').value.trim().toUpperCase();
  const km = document.getElementById('entry-km').value;
  const entry = {
    date: document.getElementById('entry-date').value,
    kilometerReading: km === '' ? null : parseFloat(km),
    spareParts: readRows('parts-rows', 'name'),
    serviceItems: readRows('service-rows', 'description'),
  };
  const errorsEl = document.getElementById('entry-errors');
  errorsEl.innerHTML = '';
  if (!number) {
    errorsEl.textContent = 'Vehicle number is required';
    return;
  }
  try {
    const { status, data } = await api('POST', '/api/vehicles/' + encodeURIComponent(number) + '/services', entry);
    if (status === 400) {
      errorsEl.innerHTML = data.errors.map(e => `${esc(e.field)}: ${esc(e.message)}`).join('<br>');
      return;
    }
    toast('Service saved');
    document.getElementById('parts-rows').innerHTML = '';
    document.getElementById('service-rows').innerHTML = '';
    loadHistory();
  } catch (e) {
    toast('Failed to save service: ' + e.message, true);
  }
}

document.getElementById('btn-lookup').addEventListener('click', loadHistory);
document.getElementById('vehicle-input').addEventListener('keydown', e => { if (e.key === 'Enter') loadHistory(); });
document.getElementById('btn-add-part').addEventListener('click', () => addRow('parts-rows', 'Part name'));
document.getElementById('btn-add-service').addEventListener('click', () => addRow('service-rows', 'Service description'));
document.getElementById('btn-save').addEventListener('click', saveService);

// ---------------------------------------------------------------------------
// Refresh, config & health
// ---------------------------------------------------------------------------
document.getElementById('btn-refresh').addEventListener('click', async () => {
  try {
    const { data } = await api('POST', '/api/refresh');
    toast(`Reloaded ${data.records} records`);
    const active = document.querySelector('nav button.active').dataset.panel;
    loadPanel(active);
  } catch (e) {
    toast('Refresh failed: ' + e.message, true);
  }
});

async function loadConfig() {
  try {
    const { data } = await api('GET', '/api/config');
    currency = data.display.currency_symbol;
    document.getElementById('shop-name').textContent = data.display.shop_name;
  } catch (e) {
    // Keep defaults
  }
}

async function loadHealth() {
  try {
    const { data: h } = await api('GET', '/api/health');
    const badges = [
      badge('Database', h.reachable ? 'ok' : 'err'),
      badge(h.legacyRecords ? `${h.legacyRecords} legacy` : 'Schema', h.legacyRecords ? 'warn' : 'ok'),
    ];
    document.getElementById('health-badges').innerHTML = badges.join(' ');
  } catch (e) {
    document.getElementById('health-badges').innerHTML = badge('Database', 'err');
  }
}

function badge(label, cls) {
  const dot = cls === 'ok' ? '●' : cls === 'warn' ? '○' : '✕';
  return `<span class="badge ${cls}">${dot} ${esc(label)}</span>`;
}

// ---------------------------------------------------------------------------
// Init
// ---------------------------------------------------------------------------
document.getElementById('entry-date').value = isoToday();
loadConfig().then(() => {
  loadDashboard();
  loadHealth();
});
</script>
</body>
</html>"##;
